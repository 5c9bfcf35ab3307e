use crate::model::Domain;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Separator between synthetic parent annotations in `generics`, the
/// PlantUML line-break escape (backslash followed by `n`).
const GENERICS_SEPARATOR: &str = "\\n";

/// Keep only the items named in `keep`, in that order.
///
/// Relations left dangling are dropped. A child whose parent was filtered
/// out gets the parent's fqn appended to its generics, so the diagram still
/// shows where its inherited members come from.
pub fn retain(domain: &mut Domain, keep: &[String]) {
    let wanted: HashSet<&str> = keep.iter().map(String::as_str).collect();
    let inheritances = domain.inheritances();
    let before = domain.items.len();

    domain.items.retain(|fqn, _| wanted.contains(fqn.as_str()));
    prune_relations(domain);

    for (parent, child) in inheritances {
        if domain.contains(&parent) {
            continue;
        }
        if let Some(item) = domain.items.get_mut(&child) {
            let generics = item.generics_mut();
            if !generics.is_empty() {
                generics.push_str(GENERICS_SEPARATOR);
            }
            generics.push_str(&parent);
        }
    }

    let mut ordered = IndexMap::with_capacity(domain.items.len());
    for fqn in keep {
        if let Some(item) = domain.items.shift_remove(fqn) {
            ordered.insert(fqn.clone(), item);
        }
    }
    domain.items = ordered;

    debug!(
        kept = domain.items.len(),
        removed = before - domain.items.len(),
        relations = domain.relations.len(),
        "filtered domain"
    );
}

/// Drop every relation with an endpoint that is no longer an item.
pub fn prune_relations(domain: &mut Domain) {
    let items = &domain.items;
    domain
        .relations
        .retain(|r| items.contains_key(&r.source_fqn) && items.contains_key(&r.target_fqn));
}

/// Restrict the domain to items declared in `<module>.<submodule>` for one
/// of `submodules`.
pub fn retain_submodules(domain: &mut Domain, module: &str, submodules: &[String]) {
    if submodules.is_empty() {
        return;
    }
    let prefixes: Vec<String> = submodules
        .iter()
        .map(|sub| format!("{}.{}.", module, sub))
        .collect();

    domain
        .items
        .retain(|fqn, _| prefixes.iter().any(|p| fqn.starts_with(p.as_str())));
    prune_relations(domain);
}
