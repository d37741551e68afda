//! Concrete implementations of the domain's matching and rendering
//! boundaries.

pub mod demo_matcher;
pub mod proposal_renderer;

pub use demo_matcher::DemoMatchingEngine;
pub use proposal_renderer::FileProposalRenderer;
