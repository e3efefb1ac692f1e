use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::error::NavError;
use crate::planner::bandit::BanditMhaStar;
use crate::planner::grid_astar::GridAStar;
use crate::planner::straight_line::StraightLine;
use crate::planner::Planner;

type Ctor = fn() -> Box<dyn Planner>;

fn make_straight_line() -> Box<dyn Planner> {
    Box::<StraightLine>::default()
}

fn make_grid_astar() -> Box<dyn Planner> {
    Box::<GridAStar>::default()
}

fn make_bandit_mha() -> Box<dyn Planner> {
    Box::<BanditMhaStar>::default()
}

// BTreeMap so `algorithms()` lists in a stable order.
static REGISTRY: Lazy<BTreeMap<&'static str, Ctor>> = Lazy::new(|| {
    let mut m: BTreeMap<&'static str, Ctor> = BTreeMap::new();
    m.insert(StraightLine::NAME, make_straight_line);
    m.insert(GridAStar::NAME, make_grid_astar);
    m.insert(BanditMhaStar::NAME, make_bandit_mha);
    m
});

pub fn algorithms() -> Vec<&'static str> {
    REGISTRY.keys().copied().collect()
}

pub fn build(name: &str) -> Result<Box<dyn Planner>, NavError> {
    REGISTRY
        .get(name)
        .map(|ctor| ctor())
        .ok_or_else(|| NavError::UnknownAlgorithm(name.to_string()))
}
