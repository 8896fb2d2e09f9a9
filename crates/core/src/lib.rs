// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod artifact;
pub mod context;
pub mod define;
pub mod hooks;
pub mod publish;

pub use artifact::ArtifactKind;
pub use context::{BuildContext, BuildEnv, ContextError};
pub use define::{extract_version, Define, FIRMWARE_VERSION_DEFINE};
pub use hooks::{HookError, HookRegistry, Lifecycle, LINK_TARGET};
pub use publish::{publish_artifacts, PublishError, PublishOptions, PublishReport};
