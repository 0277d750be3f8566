//! Struct/interface implementation inference from declared method sets.

use std::collections::{HashMap, HashSet};

use crate::analysis::{ImplementsRecord, InterfaceRecord, StructRecord};

/// Method names keyed by (package, receiver struct).
pub type MethodSets = HashMap<(String, String), HashSet<String>>;

/// A struct implements an interface of the same package when it declares
/// every method the interface names, with either value or pointer receiver.
///
/// Interfaces that name no methods are skipped.
pub fn infer_implements(
    structs: &[StructRecord],
    interfaces: &[InterfaceRecord],
    methods: &MethodSets,
) -> Vec<ImplementsRecord> {
    let mut found = Vec::new();

    for iface in interfaces {
        if iface.methods.is_empty() {
            continue;
        }
        for st in structs.iter().filter(|s| s.package == iface.package) {
            let Some(declared) = methods.get(&(st.package.clone(), st.name.clone())) else {
                continue;
            };
            if iface.methods.iter().all(|m| declared.contains(m)) {
                found.push(ImplementsRecord {
                    struct_name: st.name.clone(),
                    interface: iface.name.clone(),
                });
            }
        }
    }

    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(name: &str, package: &str) -> StructRecord {
        StructRecord {
            name: name.to_string(),
            file: "a.go".to_string(),
            package: package.to_string(),
        }
    }

    fn iface(name: &str, package: &str, methods: &[&str]) -> InterfaceRecord {
        InterfaceRecord {
            name: name.to_string(),
            file: "a.go".to_string(),
            package: package.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn sets(entries: &[(&str, &str, &[&str])]) -> MethodSets {
        entries
            .iter()
            .map(|(pkg, name, methods)| {
                (
                    (pkg.to_string(), name.to_string()),
                    methods.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_full_method_set_implements() {
        let structs = vec![st("Disk", "store"), st("Mem", "store")];
        let interfaces = vec![iface("Store", "store", &["Get", "Put"])];
        let methods = sets(&[
            ("store", "Disk", &["Get", "Put", "Close"]),
            ("store", "Mem", &["Get"]),
        ]);

        let found = infer_implements(&structs, &interfaces, &methods);
        assert_eq!(
            found,
            vec![ImplementsRecord {
                struct_name: "Disk".to_string(),
                interface: "Store".to_string(),
            }]
        );
    }

    #[test]
    fn test_other_package_and_empty_interfaces_ignored() {
        let structs = vec![st("Disk", "other")];
        let interfaces = vec![
            iface("Store", "store", &["Get"]),
            iface("Any", "other", &[]),
        ];
        let methods = sets(&[("other", "Disk", &["Get"])]);

        assert!(infer_implements(&structs, &interfaces, &methods).is_empty());
    }
}
