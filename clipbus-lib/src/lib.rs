//! # Clipbus
//!
//! Playback control for decoded audio clips over a bus/channel mixing graph.
//! An [`system::AudioSystem`] ties an output backend to a frame ticker and a
//! drift-corrected clock; [`clip::Clip`]s play into named [`channel::Channel`]s
//! grouped under a [`bus::Bus`], with pause/resume/seek/speed handled by
//! timestamp arithmetic instead of backend readback.

pub mod backend;
pub mod bus;
pub mod channel;
pub mod clip;
pub mod clock;
pub mod constants;
pub mod decode;
pub mod error;
pub mod pcm;
pub mod system;
pub mod test_data;
pub mod ticker;
