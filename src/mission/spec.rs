use super::MissionError;
use crate::conops::{
    Activity, Aggregation, AggregationKind, AllOf, AnyOf, COMPLETE, ClockAtLeast, ConOps,
    Endpoint, FAILURE, Predicate, ResourceAtLeast, ResourceAtMost, VehicleCompleted,
    VehicleInActivity,
};
use crate::sim::{ConfigError, RandomSource, SimTime, Simulator};
use crate::vehicle::Vehicle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    /// 不触发晚于该时刻的事件。
    #[serde(default)]
    pub horizon: Option<f64>,
    /// ConOps 目录：名字 -> 活动列表。
    pub conops: BTreeMap<String, Vec<ActivitySpec>>,
    pub vehicles: Vec<VehicleSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    pub conops: String,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySpec {
    pub name: String,
    pub start: String,
    pub end: EndpointSpec,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub predicate: Option<PredicateSpec>,
    #[serde(default)]
    pub p_fail: f64,
    /// 缺省为失败终止。
    #[serde(default)]
    pub failure: Option<EndpointSpec>,
    #[serde(default)]
    pub resource_change: BTreeMap<String, f64>,
    #[serde(default)]
    pub aggregation: Option<AggregationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndpointSpec {
    Event {
        name: String,
    },
    Complete {
        #[serde(default)]
        name: Option<String>,
    },
    Fail {
        #[serde(default)]
        name: Option<String>,
    },
}

impl EndpointSpec {
    pub fn to_endpoint(&self) -> Endpoint {
        match self {
            EndpointSpec::Event { name } => Endpoint::Event(name.clone()),
            EndpointSpec::Complete { name } => {
                Endpoint::Complete(name.clone().unwrap_or_else(|| COMPLETE.to_string()))
            }
            EndpointSpec::Fail { name } => {
                Endpoint::Fail(name.clone().unwrap_or_else(|| FAILURE.to_string()))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredicateSpec {
    VehicleCompleted {
        vehicle: String,
    },
    VehicleInActivity {
        vehicle: String,
        activity: String,
    },
    /// `vehicle` 缺省时检查等待该事件的航天器自身。
    ResourceAtLeast {
        #[serde(default)]
        vehicle: Option<String>,
        resource: String,
        amount: f64,
    },
    ResourceAtMost {
        #[serde(default)]
        vehicle: Option<String>,
        resource: String,
        amount: f64,
    },
    ClockAtLeast {
        time: f64,
    },
    AllOf {
        predicates: Vec<PredicateSpec>,
    },
    AnyOf {
        predicates: Vec<PredicateSpec>,
    },
}

impl PredicateSpec {
    pub fn build(&self) -> Arc<dyn Predicate> {
        match self {
            PredicateSpec::VehicleCompleted { vehicle } => Arc::new(VehicleCompleted {
                vehicle: vehicle.clone(),
            }),
            PredicateSpec::VehicleInActivity { vehicle, activity } => {
                Arc::new(VehicleInActivity {
                    vehicle: vehicle.clone(),
                    activity: activity.clone(),
                })
            }
            PredicateSpec::ResourceAtLeast {
                vehicle,
                resource,
                amount,
            } => Arc::new(ResourceAtLeast {
                vehicle: vehicle.clone(),
                resource: resource.clone(),
                amount: *amount,
            }),
            PredicateSpec::ResourceAtMost {
                vehicle,
                resource,
                amount,
            } => Arc::new(ResourceAtMost {
                vehicle: vehicle.clone(),
                resource: resource.clone(),
                amount: *amount,
            }),
            PredicateSpec::ClockAtLeast { time } => Arc::new(ClockAtLeast {
                time: SimTime(*time),
            }),
            PredicateSpec::AllOf { predicates } => {
                Arc::new(AllOf(predicates.iter().map(PredicateSpec::build).collect()))
            }
            PredicateSpec::AnyOf { predicates } => {
                Arc::new(AnyOf(predicates.iter().map(PredicateSpec::build).collect()))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub kind: AggregationKind,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub conops: Option<String>,
}

impl ActivitySpec {
    pub fn to_activity(&self) -> Result<Activity, ConfigError> {
        let end = self.end.to_endpoint();
        let activity = match (self.duration, &self.predicate) {
            (Some(duration), None) => Activity::timed(&self.name, &self.start, end, duration),
            (None, Some(predicate)) => {
                Activity::predicated(&self.name, &self.start, end, predicate.build())
            }
            _ => return Err(ConfigError::AmbiguousActivity(self.name.clone())),
        };
        let mut activity = activity.with_p_fail(self.p_fail);
        if let Some(failure) = &self.failure {
            activity = activity.with_failure(failure.to_endpoint());
        }
        activity.resource_change = self.resource_change.clone();
        if let Some(agg) = &self.aggregation {
            activity = activity.with_aggregation(Aggregation {
                kind: agg.kind,
                vehicles: agg.vehicles.clone(),
                name: agg.name.clone(),
                conops: agg.conops.clone(),
            });
        }
        Ok(activity)
    }
}

impl MissionSpec {
    pub fn from_json(raw: &str) -> Result<Self, MissionError> {
        let spec: MissionSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(MissionError::UnsupportedSchema(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MissionError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// 构建并校验全部 ConOps。
    pub fn catalog(&self) -> Result<BTreeMap<String, Arc<ConOps>>, ConfigError> {
        let mut catalog = BTreeMap::new();
        for (name, activities) in &self.conops {
            let activities = activities
                .iter()
                .map(ActivitySpec::to_activity)
                .collect::<Result<Vec<_>, _>>()?;
            catalog.insert(name.clone(), Arc::new(ConOps::new(activities)?));
        }
        for activities in self.conops.values() {
            for agg in activities.iter().filter_map(|a| a.aggregation.as_ref()) {
                if let Some(key) = &agg.conops {
                    if !catalog.contains_key(key) {
                        return Err(ConfigError::UnknownConOps(key.clone()));
                    }
                }
            }
        }
        Ok(catalog)
    }

    /// 为一次运行构建新的仿真器。
    pub fn simulator(&self, random: Box<dyn RandomSource>) -> Result<Simulator, MissionError> {
        let catalog = self.catalog()?;
        let mut sim = Simulator::with_random(random);
        if let Some(horizon) = self.horizon {
            sim.set_horizon(SimTime(horizon));
        }
        for v in &self.vehicles {
            let conops = catalog
                .get(&v.conops)
                .ok_or_else(|| ConfigError::UnknownConOps(v.conops.clone()))?;
            let mut vehicle = Vehicle::new(&v.name, Arc::clone(conops));
            for (resource, amount) in &v.resources {
                vehicle = vehicle.with_resource(resource, *amount);
            }
            sim.add_vehicle(SimTime(v.start_time), vehicle)?;
        }
        Ok(sim)
    }
}
