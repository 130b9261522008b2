//! Builds the parameterized SELECT, INSERT, UPDATE, DELETE statements for a resource.

use crate::config::ResourceDef;

/// Quote identifier for PostgreSQL (safe: only from resource definitions and validated settings).
pub fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, def: &ResourceDef) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(def.table_name))
}

fn select_column_list(def: &ResourceDef) -> String {
    [def.id_column, def.name_column, def.value_column]
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_schema(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema))
}

/// CREATE TABLE IF NOT EXISTS with a generated BIGINT id. Unique resources get a UNIQUE value column.
pub fn create_table(schema: &str, def: &ResourceDef) -> String {
    let unique = if def.unique_value { " UNIQUE" } else { "" };
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({} BIGSERIAL PRIMARY KEY, {} TEXT NOT NULL, {} {} NOT NULL{})",
        qualified_table(schema, def),
        quote_ident(def.id_column),
        quote_ident(def.name_column),
        quote_ident(def.value_column),
        def.value_kind.pg_type(),
        unique
    )
}

/// SELECT every row ordered by id. No params.
pub fn select_all(schema: &str, def: &ResourceDef) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(def),
        qualified_table(schema, def),
        quote_ident(def.id_column)
    )
}

/// SELECT by id. Params: $1 id.
pub fn select_by_id(schema: &str, def: &ResourceDef) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(def),
        qualified_table(schema, def),
        quote_ident(def.id_column)
    )
}

/// SELECT by value column. Params: $1 value.
pub fn select_by_value(schema: &str, def: &ResourceDef) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY {}",
        select_column_list(def),
        qualified_table(schema, def),
        quote_ident(def.value_column),
        quote_ident(def.id_column)
    )
}

/// INSERT returning the generated id. Params: $1 name, $2 value.
pub fn insert(schema: &str, def: &ResourceDef) -> String {
    format!(
        "INSERT INTO {} ({}, {}) VALUES ($1, $2) RETURNING {}",
        qualified_table(schema, def),
        quote_ident(def.name_column),
        quote_ident(def.value_column),
        quote_ident(def.id_column)
    )
}

/// UPDATE reporting both matched and changed row counts as `affected_rows` and `changed_rows`.
/// Params: $1 id, $2 name, $3 value.
///
/// The update only touches the row when a value differs, so the row count of the
/// data-modifying CTE is the changed count while `matched` counts the row regardless.
pub fn update_counting_changes(schema: &str, def: &ResourceDef) -> String {
    let table = qualified_table(schema, def);
    let id = quote_ident(def.id_column);
    let name = quote_ident(def.name_column);
    let value = quote_ident(def.value_column);
    format!(
        "WITH matched AS (SELECT {id} FROM {table} WHERE {id} = $1), \
         changed AS (UPDATE {table} SET {name} = $2, {value} = $3 \
         WHERE {id} = $1 AND ({name} IS DISTINCT FROM $2 OR {value} IS DISTINCT FROM $3) RETURNING {id}) \
         SELECT (SELECT COUNT(*) FROM matched) AS affected_rows, (SELECT COUNT(*) FROM changed) AS changed_rows",
    )
}

/// DELETE by id. Params: $1 id.
pub fn delete(schema: &str, def: &ResourceDef) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        qualified_table(schema, def),
        quote_ident(def.id_column)
    )
}
