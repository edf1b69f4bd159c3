//! Host side of the shader catalog.
//!
//! The units themselves live in the `catalog-shaders` crate and compile both to
//! SPIR-V and to the host. This crate looks them up, checks them, plans their
//! passes and runs them, either in a window through wgpu or on the CPU through
//! [`cpu::CpuRenderer`].

pub mod app;
pub mod catalog;
pub mod config;
pub mod cpu;
pub mod gpu;
pub mod graph;
pub mod lint;
pub mod params;
pub mod session;
pub mod textures;
pub mod uniforms;
