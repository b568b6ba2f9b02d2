//! Authoritative session host for shared tactical maps.
//!
//! ARCHITECTURE
//! ============
//! One host process owns the canonical [`tabletop::world::WorldModel`] per
//! map session. Observers submit request frames, the host validates and
//! applies them, recomputes the shared player fog, and rebroadcasts results.
//! Observers never mutate state locally except as previews.
//!
//! The transport is deliberately out of this crate: clients attach through
//! per-connection `tokio::sync::mpsc` senders registered in
//! [`state::MapSession`], and whatever socket layer embeds this crate pumps
//! frames in through [`dispatch::handle_frame`] and out through those
//! channels.
//!
//! | Module        | Responsibility                                      |
//! |---------------|-----------------------------------------------------|
//! | `config`      | Environment-driven host configuration               |
//! | `state`       | Live sessions, connected clients, roles             |
//! | `session`     | Join/part lifecycle, hydration, broadcast           |
//! | `dispatch`    | Frame -> intent -> validate -> apply -> outcome     |
//! | `turn`        | Per-session movement budget                         |
//! | `persistence` | Atomic snapshot save, lenient load                  |

pub mod config;
pub mod dispatch;
pub mod persistence;
pub mod session;
pub mod state;
pub mod turn;
