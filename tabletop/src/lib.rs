//! Tactical map model and algorithms for the `MapTable` virtual tabletop.
//!
//! This crate is the headless core shared by the host and any renderer: it
//! owns the spatial model of one battle map (grid, tokens, walls, terrain,
//! light sources), the per-observer fog-of-war and dynamic-lighting
//! computation, and the movement-legality checker that gates token moves
//! during structured turns. It performs no I/O and holds no reference to a
//! rendering surface; renderers consume the model and the [`engine::Action`]s
//! the engine emits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine: pointer events in, [`engine::Action`]s out |
//! | [`world`] | Map definition, tokens, walls, terrain, lights, ambient light |
//! | [`grid`] | Cell and corner coordinates, world-unit conversions, snapping |
//! | [`geometry`] | Segment intersection, point-in-circle, ray occlusion |
//! | [`light`] | Per-cell bright/dim/dark compositing and darkvision |
//! | [`visibility`] | Per-observer visible-cell computation |
//! | [`fog`] | Persistent explored layer, ephemeral visible layer, brushes |
//! | [`movement`] | Move legality and cost against terrain, walls, and budget |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Tool set and the gesture state machine |
//! | [`consts`] | Shared numeric constants (zoom limits, snap threshold, etc.) |

pub mod camera;
pub mod consts;
pub mod engine;
pub mod fog;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod light;
pub mod movement;
pub mod visibility;
pub mod world;
