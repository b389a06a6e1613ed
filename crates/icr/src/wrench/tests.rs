use super::*;
use crate::error::IcrError;
use crate::object::TargetObject;
use crate::shapes;
use nalgebra::{vector, Vector6};

fn square() -> TargetObject {
    TargetObject::new("square", shapes::square(1.0)).unwrap()
}

fn at(obj: &TargetObject, sample: usize, friction: FrictionModel) -> ContactPoint {
    let s = obj.samples()[sample];
    ContactPoint {
        position: s.position,
        normal: s.normal,
        friction,
    }
}

#[test]
fn wrench_counts_follow_contact_model() {
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    let soft = FrictionModel::default();
    let hard = FrictionModel::hard_finger(0.5, 6);
    let none = FrictionModel::frictionless();
    assert_eq!(eval.wrenches(&[at(&obj, 0, soft)]).len(), 6);
    assert_eq!(eval.wrenches(&[at(&obj, 0, hard)]).len(), 6);
    assert_eq!(eval.wrenches(&[at(&obj, 0, none)]).len(), 1);
    assert_eq!(none.wrench_count(), 1);
    assert_eq!(FrictionModel::soft_finger(0.5, 4, 0.0).wrench_count(), 4);
}

#[test]
fn cone_edges_are_unit_and_push_inward() {
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    let c = at(&obj, 0, FrictionModel::hard_finger(0.3, 8));
    for w in eval.wrenches(&[c]) {
        let f = vector![w[0], w[1], w[2]];
        assert!((f.norm() - 1.0).abs() < 1e-12);
        assert!(f.dot(&c.normal) < 0.0);
    }
}

#[test]
fn fewer_than_two_contacts_have_zero_quality() {
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    assert_eq!(eval.quality(&[]), 0.0);
    let one = [at(&obj, 0, FrictionModel::default())];
    assert_eq!(eval.quality(&one), 0.0);
    let space = eval.wrench_space(&one);
    assert!(space.points().is_empty());
    assert!(matches!(
        space.check_closure(),
        Err(IcrError::NotClosed { quality }) if quality == 0.0
    ));
}

#[test]
fn opposing_soft_fingers_close_the_square() {
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    let f = FrictionModel::default();
    let contacts = [at(&obj, 0, f), at(&obj, 2, f)];
    let q = eval.quality(&contacts);
    assert!(q > 0.0, "quality {q}");

    let space = eval.wrench_space(&contacts);
    assert!((space.quality() - q).abs() < 1e-12);
    assert!(space.is_closed());
    assert!(!space.facets().is_empty());
    assert!(space.contains(&Vector6::zeros()));
    for p in space.points() {
        assert!(space.contains(p));
    }
    assert_eq!(space.check_closure().unwrap(), q);
}

#[test]
fn four_soft_fingers_close_the_square() {
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    let f = FrictionModel::default();
    let contacts: Vec<ContactPoint> = (0..4).map(|s| at(&obj, s, f)).collect();
    assert_eq!(eval.wrenches(&contacts).len(), 24);
    let q = eval.quality(&contacts);
    assert!(q > 0.0, "quality {q}");
    assert!((eval.wrench_space(&contacts).quality() - q).abs() < 1e-12);
}

#[test]
fn adjacent_fingers_do_not_close() {
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    let f = FrictionModel::default();
    assert_eq!(eval.quality(&[at(&obj, 1, f), at(&obj, 2, f)]), 0.0);
}

#[test]
fn hard_fingers_cannot_resist_torsion() {
    // No wrench has a torque component about the contact axis.
    let obj = square();
    let eval = WrenchEvaluator::for_object(&obj);
    let f = FrictionModel::hard_finger(0.8, 8);
    assert_eq!(eval.quality(&[at(&obj, 0, f), at(&obj, 2, f)]), 0.0);
}

#[test]
fn invalid_friction_parameters_are_rejected() {
    assert!(FrictionModel::default().validate().is_ok());
    assert!(FrictionModel::hard_finger(-0.1, 4).validate().is_err());
    assert!(FrictionModel::hard_finger(f64::NAN, 4).validate().is_err());
    assert!(FrictionModel::hard_finger(0.5, 0).validate().is_err());
    assert!(matches!(
        FrictionModel::soft_finger(0.5, 4, -1.0).validate(),
        Err(IcrError::InvalidParameter { .. })
    ));
}

#[test]
fn friction_table_falls_back_to_default() {
    let mut table = FrictionTable::new(FrictionModel::frictionless());
    table.set("thumb".into(), FrictionModel::hard_finger(0.7, 5));
    assert_eq!(table.get(&"thumb".into()).facets, 5);
    assert_eq!(table.get(&"index".into()), FrictionModel::frictionless());
    assert_eq!(table.fallback(), FrictionModel::frictionless());
}
