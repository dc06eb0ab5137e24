//! Locale hierarchy resolution.
//!
//! A language tag's `-`/`_`-delimited segments induce a fallback tree:
//! every prefix of every active tag is a node, parented by the next-shorter
//! prefix. For each node the resolver produces the ordered candidate list
//! used when flattening:
//!
//! 1. descendants' own translations (depth-first, tree order) — lowest
//!    priority, a related dialect is better than nothing;
//! 2. each strict ancestor's *full* list, root-most first — this is what
//!    lets a sibling dialect's translation reach a node, while still losing
//!    to anything the ancestor itself has;
//! 3. the node's own translations — highest priority.
//!
//! Priority is applied downstream by "last in the list wins", so the list
//! is a concatenation, not a deduplication.

use indexmap::IndexMap;

use crate::model::Translation;
use crate::store::TranslationMap;

/// One node in the fallback tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LangNode {
    pub parent: Option<String>,
    pub children: Vec<String>,
}

/// Split a language tag into its hierarchy tokens.
fn tokens(lang: &str) -> Vec<&str> {
    lang.split(['-', '_']).collect()
}

/// Build the fallback tree for the active languages. Nodes exist for every
/// active tag and every implied ancestor prefix, each listed once; children
/// are attached in the order they are first seen over the sorted tag list.
pub fn build_hierarchy(langs: &[String]) -> IndexMap<String, LangNode> {
    let mut sorted_langs = langs.to_vec();
    sorted_langs.sort();

    let mut structure: IndexMap<String, LangNode> = IndexMap::new();
    for lang in &sorted_langs {
        let tokens = tokens(lang);
        for i in 0..tokens.len() {
            let node = tokens[..=i].join("-");
            structure.entry(node.clone()).or_default();
            if i > 0 {
                let parent = tokens[..i].join("-");
                let parent_node = structure.entry(parent.clone()).or_default();
                if !parent_node.children.contains(&node) {
                    parent_node.children.push(node.clone());
                }
                structure[&node].parent = Some(parent);
            }
        }
    }
    structure
}

/// Compute the ordered candidate list for every node of the hierarchy.
///
/// Nodes are processed in sorted order, which guarantees every strict
/// ancestor's list is complete before it is concatenated into a
/// descendant's.
pub fn candidate_lists<'a>(
    langs: &[String],
    translations: &'a TranslationMap,
) -> IndexMap<String, Vec<&'a Translation>> {
    let structure = build_hierarchy(langs);

    let mut all_langs: Vec<&String> = structure.keys().collect();
    all_langs.sort();

    let mut lists: IndexMap<String, Vec<&'a Translation>> = IndexMap::new();
    for lang in all_langs {
        let mut list = Vec::new();
        children_translations(&structure, lang, translations, &mut list);
        ancestor_translations(&lists, lang, &mut list);
        list.extend(own_translations(translations, lang));
        lists.insert(lang.clone(), list);
    }
    lists
}

/// Depth-first concatenation of every descendant's own translations, in
/// tree order.
fn children_translations<'a>(
    structure: &IndexMap<String, LangNode>,
    lang: &str,
    translations: &'a TranslationMap,
    out: &mut Vec<&'a Translation>,
) {
    for child in &structure[lang].children {
        out.extend(own_translations(translations, child));
        children_translations(structure, child, translations, out);
    }
}

/// Concatenation of every strict ancestor's full candidate list, root-most
/// first.
fn ancestor_translations<'a>(
    lists: &IndexMap<String, Vec<&'a Translation>>,
    lang: &str,
    out: &mut Vec<&'a Translation>,
) {
    let tokens = tokens(lang);
    for i in 1..tokens.len() {
        let ancestor = tokens[..i].join("-");
        out.extend(lists[&ancestor].iter().copied());
    }
}

/// Translations whose `lang` equals the node exactly, in store order.
fn own_translations<'a>(translations: &'a TranslationMap, lang: &str) -> Vec<&'a Translation> {
    translations
        .values()
        .filter(|t| t.lang == lang)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::model::Translation;
    use crate::resolver::*;

    fn t(id: &str, key_id: &str, lang: &str, text: &str) -> (String, Translation) {
        (
            id.to_string(),
            Translation {
                id: id.to_string(),
                key_id: key_id.to_string(),
                lang: lang.to_string(),
                translation: text.to_string(),
                fuzzy: false,
            },
        )
    }

    fn langs(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    fn texts(list: &[&Translation]) -> Vec<String> {
        list.iter().map(|t| t.translation.clone()).collect()
    }

    #[test]
    fn test_hierarchy_includes_implied_ancestors() {
        let structure = build_hierarchy(&langs(&["en-US-posix"]));
        assert_eq!(
            structure.keys().collect::<Vec<_>>(),
            vec!["en", "en-US", "en-US-posix"]
        );
        assert_eq!(structure["en"].parent, None);
        assert_eq!(structure["en-US"].parent.as_deref(), Some("en"));
        assert_eq!(structure["en-US-posix"].parent.as_deref(), Some("en-US"));
        assert_eq!(structure["en"].children, vec!["en-US"]);
        assert_eq!(structure["en-US"].children, vec!["en-US-posix"]);
    }

    #[test]
    fn test_hierarchy_normalizes_underscores_and_dedupes() {
        let structure = build_hierarchy(&langs(&["en_US", "en-US-posix", "en-GB"]));
        assert!(structure.contains_key("en-US"));
        assert!(!structure.contains_key("en_US"));
        // en-US appears once among en's children despite being an ancestor
        // of two configured tags.
        assert_eq!(structure["en"].children, vec!["en-GB", "en-US"]);
    }

    #[test]
    fn test_ancestor_fallback() {
        // own(en)="Hello", nothing for en-US: en-US falls back to "Hello".
        let translations = TranslationMap::from_iter([t("t1", "k1", "en", "Hello")]);
        let lists = candidate_lists(&langs(&["en", "en-US", "en-GB"]), &translations);

        assert_eq!(texts(&lists["en-US"]), vec!["Hello"]);
        // Adding own(en-US)="Hi" puts it after the ancestor: own wins on
        // last-write flattening.
        let translations = TranslationMap::from_iter([
            t("t1", "k1", "en", "Hello"),
            t("t2", "k1", "en-US", "Hi"),
        ]);
        let lists = candidate_lists(&langs(&["en", "en-US", "en-GB"]), &translations);
        assert_eq!(texts(&lists["en-US"]), vec!["Hello", "Hi"]);
    }

    #[test]
    fn test_sibling_fallback_through_ancestor() {
        // en-GB translated a key nobody else has: it reaches en-US through
        // en's children tier.
        let translations = TranslationMap::from_iter([t("t1", "k1", "en-GB", "Colour")]);
        let lists = candidate_lists(&langs(&["en-US", "en-GB"]), &translations);
        assert_eq!(texts(&lists["en-US"]), vec!["Colour"]);
    }

    #[test]
    fn test_ancestor_beats_sibling_for_same_key() {
        // Both en and en-GB carry k1. For en-US the en-GB version arrives in
        // en's children tier, the en version in en's own tier — later in the
        // list, so it wins the flatten.
        let translations = TranslationMap::from_iter([
            t("t1", "k1", "en-GB", "Colour"),
            t("t2", "k1", "en", "Color"),
        ]);
        let lists = candidate_lists(&langs(&["en-US", "en-GB"]), &translations);
        assert_eq!(texts(&lists["en-US"]), vec!["Colour", "Color"]);
    }

    #[test]
    fn test_own_list_order_children_ancestors_own() {
        let translations = TranslationMap::from_iter([
            t("t1", "k1", "en", "root"),
            t("t2", "k2", "en-US", "own"),
            t("t3", "k3", "en-US-posix", "descendant"),
        ]);
        let lists = candidate_lists(&langs(&["en", "en-US", "en-US-posix"]), &translations);
        // The ancestor tier carries en's full list, which itself contains
        // this node's subtree; the concatenation is not deduplicated, and
        // the own tier still comes last.
        assert_eq!(
            texts(&lists["en-US"]),
            vec!["descendant", "own", "descendant", "root", "own"]
        );
    }

    #[test]
    fn test_lists_exist_for_implied_nodes() {
        let translations = TranslationMap::from_iter([t("t1", "k1", "en-US", "Hi")]);
        let lists = candidate_lists(&langs(&["en-US"]), &translations);
        // The implied "en" node gets a list too (its descendant's
        // translations), so a bundle is produced for it.
        assert_eq!(texts(&lists["en"]), vec!["Hi"]);
    }

    #[test]
    fn test_duplicate_key_lang_pairs_keep_store_order() {
        let translations = TranslationMap::from_iter([
            t("t1", "k1", "en", "first"),
            t("t2", "k1", "en", "second"),
        ]);
        let lists = candidate_lists(&langs(&["en"]), &translations);
        assert_eq!(texts(&lists["en"]), vec!["first", "second"]);
    }

    #[test]
    fn test_unrelated_languages_do_not_leak() {
        let translations = TranslationMap::from_iter([
            t("t1", "k1", "en", "Hello"),
            t("t2", "k1", "fr", "Bonjour"),
        ]);
        let lists = candidate_lists(&langs(&["en", "fr"]), &translations);
        assert_eq!(texts(&lists["en"]), vec!["Hello"]);
        assert_eq!(texts(&lists["fr"]), vec!["Bonjour"]);
    }
}
