//! Folio Page Core (host-agnostic)
//!
//! State machines and scheduling for the folio page: the word-cycling text
//! effect, the scroll/load-stage reveal scheduler, the contact form submission
//! flow, anchor scroll math and the lightbox state. Nothing here touches a
//! browser API; adapters (see `folio-page-wasm`) feed [`Inputs`] into
//! [`Engine::update`] and apply the returned [`Outputs`] to the host.

pub mod config;
pub mod contact;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod lightbox;
pub mod load_stage;
pub mod navigation;
pub mod outputs;
pub mod reveal;
pub mod text_cycle;
pub mod timer;

/// Virtual time in whole milliseconds.
pub type Millis = u64;

// Re-exports for consumers (adapters)
pub use config::{ContactConfig, LoadStageConfig, ObserverConfig, PageConfig};
pub use contact::{
    ContactFlow, Endpoint, EndpointResponse, StatusTone, SubmissionRequest, SubmissionState,
    TransportError,
};
pub use engine::Engine;
pub use error::PageError;
pub use ids::{IdAllocator, SubmissionId, TargetId};
pub use inputs::{Inputs, VisibilityEntry};
pub use lightbox::{ClickTarget, Lightbox, LightboxView};
pub use load_stage::{DelayPolicy, LoadElement, LoadStageGroup, LoadStagePlan};
pub use navigation::{AnchorNavigator, Layout, ScrollBehavior, ScrollRequest};
pub use outputs::{Change, Outputs, PageEvent};
pub use reveal::{ObserverOptions, RevealScheduler, RevealTarget};
pub use text_cycle::{CyclePhase, CycleState, CycleTiming, TextCycle, WordList};
pub use timer::{TimerId, TimerQueue};
