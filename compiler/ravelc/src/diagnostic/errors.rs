use std::fmt;

use itertools::Itertools;

use crate::compiler::component::CanonicalProvider;
use crate::language::TypeKey;

/// A defect in the dependency-injection graph.
///
/// Every variant carries enough data to point the user at the declarations
/// involved; none of them aborts resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("There is no module named `{module}`, but one of your components or modules includes it.")]
    MissingModule { module: String },
    #[error("There is no component named `{component}`, but one of your components or modules installs it as a subcomponent.")]
    MissingSubcomponent { component: String },
    #[error(
        "You registered multiple providers for `{key}`: {}. A key can only be shared by collection contributions.",
        render_origins(.providers)
    )]
    DuplicateProvider {
        key: TypeKey,
        /// Every binding in the offending group, in discovery order.
        providers: Vec<CanonicalProvider>,
    },
    #[error("{}", render_missing_provider(.dependency, .depended_upon))]
    MissingProvider {
        dependency: TypeKey,
        /// The binding that declared the dependency, or `None` when the
        /// dependency is the component's own root object.
        depended_upon: Option<CanonicalProvider>,
        /// Modules, anywhere in the linked interface, whose providers could
        /// satisfy the dependency. A hint, not a scope assertion.
        suggested_modules: Vec<String>,
    },
    #[error("{}", render_cycle(.chain))]
    CyclicalDependency {
        /// The keys along the cycle; the first and last entries coincide.
        chain: Vec<TypeKey>,
    },
}

fn render_origins(providers: &[CanonicalProvider]) -> String {
    providers.iter().map(|p| p.origin().to_string()).join(", ")
}

fn render_cycle(chain: &[TypeKey]) -> String {
    format!(
        "I can't build `{}` because its dependency graph contains a cycle: {}.",
        chain[0],
        chain.iter().join(" -> ")
    )
}

fn render_missing_provider(
    dependency: &TypeKey,
    depended_upon: &Option<CanonicalProvider>,
) -> String {
    match depended_upon {
        Some(binding) => {
            format!("I can't find a provider for `{dependency}`, but {binding}, depends on it.")
        }
        None => format!(
            "I can't find a provider for `{dependency}`, the object this component is supposed to build."
        ),
    }
}

impl miette::Diagnostic for ResolutionError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            ResolutionError::MissingModule { .. } => "ravelc::missing_module",
            ResolutionError::MissingSubcomponent { .. } => "ravelc::missing_subcomponent",
            ResolutionError::DuplicateProvider { .. } => "ravelc::duplicate_provider",
            ResolutionError::MissingProvider { .. } => "ravelc::missing_provider",
            ResolutionError::CyclicalDependency { .. } => "ravelc::cyclical_dependency",
        };
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            ResolutionError::MissingProvider {
                suggested_modules, ..
            } if !suggested_modules.is_empty() => {
                let modules = suggested_modules.iter().map(|m| format!("`{m}`")).join(", ");
                Some(Box::new(format!(
                    "One of these modules can provide it, you may want to include it: {modules}."
                )))
            }
            ResolutionError::DuplicateProvider { key, .. } => Some(Box::new(format!(
                "Remove all but one of the providers for `{key}`, or declare them all as collection contributions."
            ))),
            ResolutionError::CyclicalDependency { .. } => Some(Box::new(
                "Turn one of the dependencies along the cycle into a weak reference to break it.",
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ResolutionError;
    use crate::language::TypeKey;
    use miette::Diagnostic;

    #[test]
    fn cycle_chains_render_in_path_order() {
        let e = ResolutionError::CyclicalDependency {
            chain: ["A", "B", "C", "A"].map(TypeKey::new).to_vec(),
        };
        assert_eq!(
            e.to_string(),
            "I can't build `A` because its dependency graph contains a cycle: A -> B -> C -> A."
        );
    }

    #[test]
    fn missing_provider_help_lists_the_suggested_modules() {
        let e = ResolutionError::MissingProvider {
            dependency: TypeKey::new("Svc"),
            depended_upon: None,
            suggested_modules: vec!["MSvc".into(), "MOther".into()],
        };
        let help = e.help().unwrap().to_string();
        assert!(help.contains("`MSvc`, `MOther`"));
    }

    #[test]
    fn missing_provider_without_suggestions_has_no_help() {
        let e = ResolutionError::MissingProvider {
            dependency: TypeKey::new("Svc"),
            depended_upon: None,
            suggested_modules: vec![],
        };
        assert!(e.help().is_none());
    }
}
