//! Conditional subsystem installation.
//!
//! Evaluates every candidate's presence condition once, in order. The
//! signals the surviving candidates produce are collected before any binding
//! is resolved, so a consumer may be listed ahead of its producer. Each
//! installed candidate's resource requests become one overlay layer.
//! Candidates whose condition fails leave no trace, including the signals
//! they would have produced.

use std::collections::BTreeMap;

use socplan_board::BoardCapabilities;
use socplan_clock::ClockDomainGraph;
use socplan_resources::{RegionRequest, ResourceLayer};

use crate::error::InstallError;
use crate::subsystem::{BoundSignal, SignalSource, Subsystem, SubsystemSpec};

/// Result of evaluating the candidate list.
#[derive(Debug, Clone, Default)]
pub struct Installation {
    /// Instantiated subsystems, in candidate order.
    pub subsystems: Vec<Subsystem>,
    /// One overlay per installed subsystem, in candidate order.
    pub layers: Vec<ResourceLayer>,
    /// Region size requests of the installed subsystems.
    pub regions: Vec<RegionRequest>,
    /// Names of the candidates left out.
    pub skipped: Vec<String>,
}

impl Installation {
    pub fn is_installed(&self, name: &str) -> bool {
        self.subsystems.iter().any(|s| s.name == name)
    }
}

/// Signal name -> producing subsystem, over the installed candidates only.
type Producers<'a> = BTreeMap<&'a str, &'a str>;

fn collect_producers<'a>(
    installed: &[&'a SubsystemSpec],
    graph: &ClockDomainGraph,
) -> Result<Producers<'a>, InstallError> {
    let mut producers = Producers::new();
    for &spec in installed {
        for signal in &spec.produces {
            let first = if graph.signal(signal).is_some() {
                Some("clock tree")
            } else {
                producers.get(signal.as_str()).copied()
            };
            if let Some(first) = first {
                return Err(InstallError::DuplicateSignal {
                    signal: signal.clone(),
                    first: first.into(),
                    second: spec.name.clone(),
                });
            }
            producers.insert(signal.as_str(), spec.name.as_str());
        }
    }
    Ok(producers)
}

fn instantiate(
    spec: &SubsystemSpec,
    graph: &ClockDomainGraph,
    producers: &Producers<'_>,
) -> Result<Subsystem, InstallError> {
    let domain = graph
        .domain(&spec.clock_domain)
        .ok_or_else(|| InstallError::UnresolvedDomain {
            subsystem: spec.name.clone(),
            domain: spec.clock_domain.clone(),
        })?;

    let bindings = spec
        .cross_signals
        .iter()
        .map(|binding| {
            let source = match graph.signal(&binding.signal) {
                Some(id) => SignalSource::Clock(id),
                None => match producers.get(binding.signal.as_str()) {
                    Some(producer) => SignalSource::Subsystem {
                        producer: (*producer).into(),
                        signal: binding.signal.clone(),
                    },
                    None => {
                        return Err(InstallError::UnresolvedSignal {
                            subsystem: spec.name.clone(),
                            port: binding.port.clone(),
                            signal: binding.signal.clone(),
                        })
                    }
                },
            };
            Ok(BoundSignal {
                port: binding.port.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Subsystem {
        name: spec.name.clone(),
        clock_domain: domain.id,
        resources: spec.resources.clone(),
        regions: spec.regions.clone(),
        bindings,
        produces: spec.produces.clone(),
        local_domains: spec.local_domains.clone(),
    })
}

/// Instantiate every candidate whose presence condition holds for `caps`.
pub fn install(
    caps: &BoardCapabilities,
    candidates: &[SubsystemSpec],
    graph: &ClockDomainGraph,
) -> Result<Installation, InstallError> {
    let mut installation = Installation::default();

    let mut installed = Vec::new();
    for spec in candidates {
        if spec.presence.evaluate(caps) {
            installed.push(spec);
        } else {
            log::debug!("skipping subsystem {}: presence condition is false", spec.name);
            installation.skipped.push(spec.name.clone());
        }
    }

    let producers = collect_producers(&installed, graph)?;

    for spec in installed {
        let subsystem = instantiate(spec, graph, &producers)?;
        log::debug!(
            "installed subsystem {} ({} resources, {} bindings)",
            subsystem.name,
            subsystem.resources.len(),
            subsystem.bindings.len()
        );
        installation.layers.push(spec.layer());
        installation.regions.extend(spec.regions.iter().cloned());
        installation.subsystems.push(subsystem);
    }
    Ok(installation)
}
