//! Subsystem declarations and installed subsystems.

use serde::{Deserialize, Serialize};

use socplan_clock::{DomainId, SignalId};
use socplan_resources::{RegionRequest, ResourceEntry, ResourceLayer};

use crate::condition::Condition;

/// Connects one input port of a subsystem to a named signal, produced either
/// by the clock tree or by another installed subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBinding {
    /// Input port on the subsystem (e.g., "clk4x_wr_strb").
    pub port: String,
    /// Name of the produced signal (e.g., "write_strobe").
    pub signal: String,
}

/// A candidate subsystem: what it needs and when it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubsystemSpec {
    pub name: String,
    pub presence: Condition,
    /// Clock domain the subsystem's bus side runs in.
    pub clock_domain: String,
    pub resources: Vec<ResourceEntry>,
    pub regions: Vec<RegionRequest>,
    pub cross_signals: Vec<SignalBinding>,
    /// Signals this subsystem drives for others to bind.
    pub produces: Vec<String>,
    /// Clock domains the subsystem generates itself, asynchronous to `sys`.
    pub local_domains: Vec<String>,
}

impl SubsystemSpec {
    pub fn new(name: impl Into<String>, presence: Condition) -> Self {
        Self {
            name: name.into(),
            presence,
            clock_domain: "sys".into(),
            resources: Vec::new(),
            regions: Vec::new(),
            cross_signals: Vec::new(),
            produces: Vec::new(),
            local_domains: Vec::new(),
        }
    }

    pub fn in_domain(mut self, domain: &str) -> Self {
        self.clock_domain = domain.into();
        self
    }

    pub fn resource(mut self, entry: ResourceEntry) -> Self {
        self.resources.push(entry);
        self
    }

    pub fn region(mut self, name: &str, size: u64) -> Self {
        self.regions.push(RegionRequest::new(name, size));
        self
    }

    pub fn bind(mut self, port: &str, signal: &str) -> Self {
        self.cross_signals.push(SignalBinding {
            port: port.into(),
            signal: signal.into(),
        });
        self
    }

    pub fn produce(mut self, signal: &str) -> Self {
        self.produces.push(signal.into());
        self
    }

    pub fn local_domain(mut self, domain: &str) -> Self {
        self.local_domains.push(domain.into());
        self
    }

    /// The subsystem's resource requests as an overlay layer.
    pub fn layer(&self) -> ResourceLayer {
        ResourceLayer {
            origin: self.name.clone(),
            entries: self.resources.clone(),
        }
    }
}

/// Where a bound signal comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalSource {
    /// A signal of the clock tree.
    Clock(SignalId),
    /// A signal driven by another installed subsystem.
    Subsystem { producer: String, signal: String },
}

/// A port bound to a produced signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundSignal {
    pub port: String,
    pub source: SignalSource,
}

/// An instantiated subsystem. Holds ids into the clock tree, never copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Subsystem {
    pub name: String,
    pub clock_domain: DomainId,
    pub resources: Vec<ResourceEntry>,
    pub regions: Vec<RegionRequest>,
    pub bindings: Vec<BoundSignal>,
    pub produces: Vec<String>,
    pub local_domains: Vec<String>,
}

impl Subsystem {
    /// Source bound to `port`, if any.
    pub fn binding(&self, port: &str) -> Option<&SignalSource> {
        self.bindings
            .iter()
            .find(|b| b.port == port)
            .map(|b| &b.source)
    }
}
