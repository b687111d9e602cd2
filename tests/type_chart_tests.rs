use trainer_battle_engine::types::type_multiplier_by_name;
use trainer_battle_engine::{type_multiplier, ElementType, TypeSet};

#[test]
fn single_type_advantages() {
    assert_eq!(type_multiplier_by_name("Fuego", "Planta"), 2.0);
    assert_eq!(type_multiplier_by_name("Planta", "Fuego"), 0.5);
    assert_eq!(type_multiplier_by_name("Dragón", "Dragón"), 2.0);
    assert_eq!(type_multiplier_by_name("dragon", "DRAGON"), 2.0);
    assert_eq!(type_multiplier_by_name("Normal", "Agua"), 1.0);
}

#[test]
fn no_pairing_is_ever_immune() {
    for a in ElementType::ALL {
        for b in ElementType::ALL {
            for d in ElementType::ALL {
                let product = type_multiplier(TypeSet::dual(a, b), TypeSet::single(d));
                assert!(product > 0.0);
            }
        }
    }
}

#[test]
fn dual_types_multiply() {
    assert_eq!(type_multiplier_by_name("Hielo", "Planta/Volador"), 4.0);
    assert_eq!(type_multiplier_by_name("Fuego", "Agua/Roca"), 0.25);
    // Fighting hits Normal hard but Flying resists it.
    assert_eq!(type_multiplier_by_name("Lucha", "Normal/Volador"), 1.0);
}

#[test]
fn type_sets_parse_store_strings() {
    let set = TypeSet::parse("Fuego/Volador");
    assert!(set.contains(ElementType::Fire));
    assert!(set.contains(ElementType::Flying));
    assert_eq!(set.len(), 2);
    assert_eq!(TypeSet::parse("Volador/Fuego"), set);
    assert_eq!(TypeSet::parse("Fuego/Agua/Planta").len(), 2);

    let unknown = TypeSet::parse("Sonido");
    assert_eq!(unknown.iter().collect::<Vec<_>>(), vec![ElementType::Normal]);
    assert_eq!(type_multiplier(unknown, TypeSet::single(ElementType::Rock)), 0.5);
}
