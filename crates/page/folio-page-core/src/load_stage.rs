//! Initial-load reveal sequence.
//!
//! The host classifies each above-the-fold element into a [`LoadElement`];
//! [`LoadStagePlan`] expands those into groups with a delay policy. The plan is
//! evaluated once at startup and never consults the visibility monitor.

use serde::{Deserialize, Serialize};

use crate::config::LoadStageConfig;
use crate::ids::TargetId;
use crate::Millis;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DelayPolicy {
    /// Revealed synchronously while the plan is scheduled.
    Immediate,
    /// Every item after the same delay.
    Flat { delay_ms: Millis },
    /// Item `i` after `base_ms + i * step_ms`.
    Stagger { base_ms: Millis, step_ms: Millis },
}

impl DelayPolicy {
    /// Delay for the item at `index`; `None` means reveal immediately.
    pub fn delay_for(&self, index: usize) -> Option<Millis> {
        match *self {
            DelayPolicy::Immediate => None,
            DelayPolicy::Flat { delay_ms } => Some(delay_ms),
            DelayPolicy::Stagger { base_ms, step_ms } => {
                Some(base_ms.saturating_add(step_ms.saturating_mul(index as Millis)))
            }
        }
    }
}

/// Above-the-fold element kinds, already resolved to target handles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadElement {
    Generic { target: TargetId },
    /// The site logo.
    Brand { target: TargetId },
    /// A navigation bar; each link is revealed on its own, left to right.
    Navigation { links: Vec<TargetId> },
    /// The hero banner. Its text and image blocks are mandatory.
    PrimaryBanner {
        container: TargetId,
        text: TargetId,
        image: TargetId,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStageGroup {
    pub name: String,
    pub targets: Vec<TargetId>,
    pub policy: DelayPolicy,
}

impl LoadStageGroup {
    /// `(target, delay)` pairs; `None` delays are immediate.
    pub fn schedule(&self) -> impl Iterator<Item = (TargetId, Option<Millis>)> + '_ {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (*t, self.policy.delay_for(i)))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStagePlan {
    pub groups: Vec<LoadStageGroup>,
}

impl LoadStagePlan {
    pub fn from_elements(elements: &[LoadElement], cfg: &LoadStageConfig) -> Self {
        let mut groups = Vec::new();
        for element in elements {
            match element {
                LoadElement::Generic { target } => groups.push(LoadStageGroup {
                    name: "generic".into(),
                    targets: vec![*target],
                    policy: DelayPolicy::Flat {
                        delay_ms: cfg.generic_delay_ms,
                    },
                }),
                LoadElement::Brand { target } => groups.push(LoadStageGroup {
                    name: "brand".into(),
                    targets: vec![*target],
                    policy: DelayPolicy::Flat {
                        delay_ms: cfg.brand_delay_ms,
                    },
                }),
                LoadElement::Navigation { links } => groups.push(LoadStageGroup {
                    name: "navigation".into(),
                    targets: links.clone(),
                    policy: DelayPolicy::Stagger {
                        base_ms: cfg.nav_base_ms,
                        step_ms: cfg.nav_step_ms,
                    },
                }),
                LoadElement::PrimaryBanner {
                    container,
                    text,
                    image,
                } => {
                    groups.push(LoadStageGroup {
                        name: "banner".into(),
                        targets: vec![*container],
                        policy: DelayPolicy::Flat {
                            delay_ms: cfg.banner_delay_ms,
                        },
                    });
                    groups.push(LoadStageGroup {
                        name: "banner-parts".into(),
                        targets: vec![*text, *image],
                        policy: DelayPolicy::Immediate,
                    });
                }
            }
        }
        Self { groups }
    }

    /// Every target the plan touches.
    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.groups.iter().flat_map(|g| g.targets.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stagger_grows_by_step() {
        let p = DelayPolicy::Stagger {
            base_ms: 500,
            step_ms: 100,
        };
        assert_eq!(p.delay_for(0), Some(500));
        assert_eq!(p.delay_for(3), Some(800));
        assert_eq!(DelayPolicy::Immediate.delay_for(7), None);
    }

    #[test]
    fn banner_expands_into_delayed_container_and_immediate_parts() {
        let plan = LoadStagePlan::from_elements(
            &[LoadElement::PrimaryBanner {
                container: TargetId(0),
                text: TargetId(1),
                image: TargetId(2),
            }],
            &LoadStageConfig::default(),
        );
        assert_eq!(plan.groups.len(), 2);
        let container: Vec<_> = plan.groups[0].schedule().collect();
        assert_eq!(container, vec![(TargetId(0), Some(100))]);
        let parts: Vec<_> = plan.groups[1].schedule().collect();
        assert_eq!(parts, vec![(TargetId(1), None), (TargetId(2), None)]);
    }

    #[test]
    fn each_navigation_restarts_its_stagger() {
        let plan = LoadStagePlan::from_elements(
            &[
                LoadElement::Navigation {
                    links: vec![TargetId(0), TargetId(1)],
                },
                LoadElement::Navigation {
                    links: vec![TargetId(2)],
                },
            ],
            &LoadStageConfig::default(),
        );
        let delays: Vec<_> = plan
            .groups
            .iter()
            .flat_map(|g| g.schedule())
            .map(|(_, d)| d)
            .collect();
        assert_eq!(delays, vec![Some(500), Some(600), Some(500)]);
    }
}
