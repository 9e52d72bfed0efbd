use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{ArrayOfTables, Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Appends `docs` to the comment prefix of `decor`, one `#` line per doc line.
///
/// An existing prefix is kept and separated from the new comments by an empty `#` line.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let old_prefix = decor.prefix().and_then(RawString::as_str);
    let last_line = old_prefix.and_then(|prefix| prefix.lines().last());

    let comments: String = docs
        .lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect();

    let new_prefix = match (old_prefix, last_line) {
        (Some(prefix), Some(last)) if !last.is_empty() => format!("{prefix}#\n{comments}"),
        (Some(prefix), _) => format!("{prefix}{comments}"),
        (None, _) => comments,
    };
    decor.set_prefix(new_prefix);
}

/// Writes the field docs of `T` above every matching key of `table`.
///
/// Non-root tables also get the type-level docs of `T`. Keys without field docs are
/// logged and left alone.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let key_str = key.get();
        let Ok(docs) = T::get_field_docs(key_str) else {
            warn!(
                "Field '{}' has no documentation in '{}'",
                key_str,
                type_name::<T>()
            );
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(key_str.into())),
            Item::Value(_) => append_docs_as_toml_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                if let Some(first) = array.iter_mut().next() {
                    append_docs_as_toml_comments(first.decor_mut(), docs);
                }
            }
        }
    }

    Ok(())
}

/// Annotates the first table of `array` with the docs of `T`. Every record in the array
/// has the same shape, so the remaining tables stay bare.
pub fn annotate_toml_array_of_tables<T>(array: &mut ArrayOfTables) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if let Some(first_table) = array.iter_mut().next() {
        annotate_toml_table::<T>(first_table, false)
            .map_err(|err| ConfigError::AnnotateFirstTable(err.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use toml_edit::{Decor, DocumentMut};

    use super::*;
    use crate::{config::Config, repository::ManagedRepositoryConfiguration};

    fn prefix(decor: &Decor) -> String {
        decor
            .prefix()
            .and_then(|p| p.as_str())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_append_docs_multiline() {
        let mut decor = Decor::new("", "");
        append_docs_as_toml_comments(&mut decor, "Line 1\n\nLine 2");
        assert_eq!(prefix(&decor), "# Line 1\n#\n# Line 2\n");
    }

    #[test]
    fn test_append_docs_keeps_existing_prefix() {
        let mut decor = Decor::new("# existing\n", "");
        append_docs_as_toml_comments(&mut decor, "added");
        assert_eq!(prefix(&decor), "# existing\n#\n# added\n");
    }

    #[test]
    fn test_annotate_record_table() {
        let mut doc = "id = \"internal\"\nscanned = true\nunknown_key = 1"
            .parse::<DocumentMut>()
            .unwrap();

        annotate_toml_table::<ManagedRepositoryConfiguration>(doc.as_table_mut(), true).unwrap();

        let rendered = doc.to_string();
        assert!(rendered.contains("# Unique id of the repository."));
        assert!(rendered.contains("# Whether the repository is scanned by the scheduler."));
        assert!(rendered.contains("unknown_key = 1"));
    }

    #[test]
    fn test_annotate_config_document() {
        let doc = Config::default_config().to_annotated_document().unwrap();
        let rendered = doc.to_string();

        assert!(rendered.contains("# Locally hosted repositories."));
        assert!(rendered.contains("# A locally hosted repository."));
        assert!(rendered.contains("# Ids of the member repositories."));
    }
}
