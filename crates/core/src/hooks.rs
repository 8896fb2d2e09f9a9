// fwrelease - Firmware Build Hooks
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::context::{BuildContext, ContextError};
use crate::publish::{self, PublishError, PublishOptions, PublishReport};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Link target the publisher waits for. The `.bin` image is derived from it,
/// so both artifacts exist once this target has been produced.
pub const LINK_TARGET: &str = "$BUILD_DIR/${PROGNAME}.elf";

pub const PUBLISHER_HOOK: &str = "publish_artifacts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    PreBuild,
    /// After the target (an orchestrator path template) has been built.
    PostAction(String),
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::PreBuild => f.write_str("pre-build"),
            Lifecycle::PostAction(target) => write!(f, "post-action({})", target),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("hook '{0}' is already registered for {1}")]
    Duplicate(String, Lifecycle),
}

pub type HookAction<T> = Box<dyn Fn(&dyn BuildContext) -> Result<T, HookError>>;

struct Hook<T> {
    name: String,
    event: Lifecycle,
    action: HookAction<T>,
}

/// Named callbacks keyed by lifecycle event, run in registration order.
pub struct HookRegistry<T> {
    hooks: Vec<Hook<T>>,
}

impl<T> Default for HookRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HookRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|h| (&h.name, &h.event)))
            .finish()
    }
}

impl<T> HookRegistry<T> {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn add_pre_action<F>(&mut self, name: &str, action: F) -> Result<(), HookError>
    where
        F: Fn(&dyn BuildContext) -> Result<T, HookError> + 'static,
    {
        self.add(name, Lifecycle::PreBuild, Box::new(action))
    }

    pub fn add_post_action<F>(
        &mut self,
        target: &str,
        name: &str,
        action: F,
    ) -> Result<(), HookError>
    where
        F: Fn(&dyn BuildContext) -> Result<T, HookError> + 'static,
    {
        self.add(
            name,
            Lifecycle::PostAction(target.to_string()),
            Box::new(action),
        )
    }

    fn add(
        &mut self,
        name: &str,
        event: Lifecycle,
        action: HookAction<T>,
    ) -> Result<(), HookError> {
        if self.hooks.iter().any(|h| h.name == name && h.event == event) {
            return Err(HookError::Duplicate(name.to_string(), event));
        }
        debug!("Registered hook '{}' on {}", name, event);
        self.hooks.push(Hook {
            name: name.to_string(),
            event,
            action,
        });
        Ok(())
    }

    pub fn run_pre_actions(
        &self,
        ctx: &dyn BuildContext,
    ) -> Vec<(String, Result<T, HookError>)> {
        self.run_matching(ctx, |event| *event == Lifecycle::PreBuild)
    }

    /// Runs every post-action whose target template expands to `built`.
    pub fn run_post_actions(
        &self,
        built: &Path,
        ctx: &dyn BuildContext,
    ) -> Vec<(String, Result<T, HookError>)> {
        self.run_matching(ctx, |event| match event {
            Lifecycle::PostAction(target) => Path::new(&ctx.subst(target)) == built,
            Lifecycle::PreBuild => false,
        })
    }

    fn run_matching(
        &self,
        ctx: &dyn BuildContext,
        matches: impl Fn(&Lifecycle) -> bool,
    ) -> Vec<(String, Result<T, HookError>)> {
        self.hooks
            .iter()
            .filter(|h| matches(&h.event))
            .map(|h| {
                info!("Running hook '{}' ({})", h.name, h.event);
                (h.name.clone(), (h.action)(ctx))
            })
            .collect()
    }
}

/// Registers the artifact publisher as a post-action on the link target.
///
/// Returns `Ok(false)` without touching anything when there is no host
/// registry, e.g. when the hooks are loaded outside of a real build.
pub fn register_publisher(
    host: Option<&mut HookRegistry<PublishReport>>,
    opts: PublishOptions,
) -> Result<bool, HookError> {
    let Some(registry) = host else {
        return Ok(false);
    };
    registry.add_post_action(LINK_TARGET, PUBLISHER_HOOK, move |ctx| {
        let report = publish::publish_artifacts(ctx, &opts)?;
        for line in report.summary_lines() {
            info!("{}", line);
        }
        Ok(report)
    })?;
    Ok(true)
}

/// Like [`register_publisher`], but never fails.
pub fn try_register_publisher(
    host: Option<&mut HookRegistry<PublishReport>>,
    opts: PublishOptions,
) -> bool {
    match register_publisher(host, opts) {
        Ok(registered) => registered,
        Err(e) => {
            debug!("Publisher not registered: {}", e);
            false
        }
    }
}
