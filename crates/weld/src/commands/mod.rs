//! CLI command implementations.

pub(crate) mod resolve;
pub(crate) mod serve;

use std::sync::Arc;

use weld_config::{Config, UnknownElement};
use weld_resolver::{
    ControllerSet, ElementNaming, ElementResolver, FsTemplates, PropertyFilter, Resolver,
    TemplateChain, UnknownElementPolicy,
};

use crate::error::CliError;

pub(crate) use resolve::ResolveArgs;
pub(crate) use serve::ServeArgs;

/// Assemble the resolver described by the loaded configuration.
///
/// Templates from `templates_dir` take precedence over the built-in ones.
pub(crate) fn build_resolver(config: &Config) -> Result<Resolver, CliError> {
    let settings = &config.resolver_resolved;

    let controllers = if settings.builtin_widgets {
        weld_widgets::builtin_controllers()
    } else {
        ControllerSet::new()
    };

    let mut templates = TemplateChain::new();
    if let Some(dir) = &settings.templates_dir {
        let local = FsTemplates::new(dir)?;
        tracing::info!(dir = %dir.display(), templates = local.len(), "Indexed template directory");
        templates = templates.with(local);
    }
    if settings.builtin_widgets {
        templates = templates.with(weld_widgets::builtin_templates());
    }

    let elements = ElementResolver::new(Arc::new(controllers), Arc::new(templates))
        .with_naming(ElementNaming::new(&settings.widget_attribute))
        .with_unknown_element(unknown_element_policy(settings.unknown_element));

    Ok(Resolver::new(elements).with_property_filter(PropertyFilter::new(&settings.property_paths)))
}

fn unknown_element_policy(setting: UnknownElement) -> UnknownElementPolicy {
    match setting {
        UnknownElement::Comment => UnknownElementPolicy::Comment,
        UnknownElement::Keep => UnknownElementPolicy::Keep,
        UnknownElement::Remove => UnknownElementPolicy::Remove,
    }
}
