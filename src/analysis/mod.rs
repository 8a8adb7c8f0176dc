// src/analysis/mod.rs
//
// Per-frame analysis stages.
//
// Signal flow:
//   Pose → metric_extractor → FrameHistory → aggregator ─┬→ skill_classifier ─┐
//                                                       │                    ├→ event_markers
//                                                       └────────────────────┴→ tip_generator
//
// Orchestrated by analysis_pipeline::AnalysisPipeline.

pub mod aggregator;
pub mod analysis_pipeline;
pub mod event_markers;
pub mod metric_extractor;
pub mod skill_classifier;
pub mod tip_generator;
