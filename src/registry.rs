use crate::errors::CliError;
use crate::modules::{
    CertsModule, DnsModule, HeadersModule, IpInfoModule, ReconModule, SocialModule, WhoisModule,
};

type ModuleFactory = fn() -> Box<dyn ReconModule>;

/// Static table of collectors, iterated in registration order so report
/// section ordering is reproducible run to run.
pub struct ModuleRegistry {
    entries: Vec<(&'static str, ModuleFactory)>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                ("whois", || Box::new(WhoisModule::default())),
                ("dns", || Box::new(DnsModule::default())),
                ("certs", || Box::new(CertsModule::default())),
                ("headers", || Box::new(HeadersModule::default())),
                ("ipinfo", || Box::new(IpInfoModule::default())),
                ("social", || Box::new(SocialModule::default())),
            ],
        }
    }
}

impl ModuleRegistry {
    /// Canonical module names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// Name/description pairs for `--list-modules`.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.entries
            .iter()
            .map(|(name, factory)| (*name, factory().description()))
            .collect()
    }

    /// Instantiate every registered module, in registration order.
    pub fn all(&self) -> Vec<Box<dyn ReconModule>> {
        self.entries.iter().map(|(_, factory)| factory()).collect()
    }

    /// Resolve a comma-separated selection into module instances. The
    /// selection is validated first and instantiated in registration order,
    /// so report layout does not depend on how the user spelled the list.
    /// Fails naming the first unknown token; no module is constructed in
    /// that case.
    pub fn resolve(&self, selection: &str) -> Result<Vec<Box<dyn ReconModule>>, CliError> {
        let mut requested = Vec::new();
        for token in selection.split(',') {
            let key = token.trim().to_lowercase();
            if !self.entries.iter().any(|(name, _)| *name == key) {
                return Err(CliError::UnknownModule(token.trim().to_string()));
            }
            requested.push(key);
        }
        Ok(self
            .entries
            .iter()
            .filter(|(name, _)| requested.iter().any(|key| key == name))
            .map(|(_, factory)| factory())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_stable() {
        let registry = ModuleRegistry::default();
        assert_eq!(
            registry.names(),
            vec!["whois", "dns", "certs", "headers", "ipinfo", "social"]
        );
    }

    #[test]
    fn default_selection_matches_listed_names() {
        let registry = ModuleRegistry::default();
        let listed = registry.names();
        let invoked: Vec<&str> = registry.all().iter().map(|m| m.name()).collect();
        assert_eq!(listed, invoked);
    }

    #[test]
    fn describe_pairs_each_name_with_a_description() {
        let registry = ModuleRegistry::default();
        for (name, description) in registry.describe() {
            assert!(!name.is_empty());
            assert!(!description.is_empty());
        }
    }

    #[test]
    fn resolve_normalizes_case_and_whitespace() {
        let registry = ModuleRegistry::default();
        let modules = registry.resolve(" DNS , whois").unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["whois", "dns"]);
    }

    #[test]
    fn resolve_yields_registration_order_regardless_of_spelling() {
        let registry = ModuleRegistry::default();
        let modules = registry.resolve("social,certs,whois").unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["whois", "certs", "social"]);
    }

    #[test]
    fn resolve_names_the_unknown_token() {
        let registry = ModuleRegistry::default();
        let err = registry.resolve("dns,shodan").err().unwrap();
        assert!(matches!(err, CliError::UnknownModule(ref token) if token == "shodan"));
    }
}
