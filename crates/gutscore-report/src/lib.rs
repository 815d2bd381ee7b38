//! Results page generation for gutscore.
//!
//! Renders a completed [`AssessmentReport`](gutscore_core::report::AssessmentReport)
//! as a self-contained HTML page.

pub mod html;
