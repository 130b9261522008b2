//! Static resource definitions: the tables served over HTTP and how their fields map to columns.

/// Storage type of a resource's value column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// BIGINT column, JSON integer.
    Integer,
    /// DOUBLE PRECISION column, JSON number.
    Decimal,
}

impl ValueKind {
    pub fn pg_type(self) -> &'static str {
        match self {
            ValueKind::Integer => "BIGINT",
            ValueKind::Decimal => "DOUBLE PRECISION",
        }
    }
}

/// One CRUD resource. Every resource has an auto-generated id, a textual name and a single numeric value.
#[derive(Debug)]
pub struct ResourceDef {
    /// Route segment, e.g. `customers` for `/customers` and `/customers/:id`.
    pub path_segment: &'static str,
    pub table_name: &'static str,
    pub id_column: &'static str,
    pub name_column: &'static str,
    pub value_column: &'static str,
    /// JSON field carrying the value in request and response bodies.
    pub value_field: &'static str,
    pub value_kind: ValueKind,
    /// When set, no two rows may share the same value.
    pub unique_value: bool,
    /// Capitalised singular used in messages ("Customer").
    pub label: &'static str,
}

impl ResourceDef {
    /// Lowercase singular used mid-sentence ("customer").
    pub fn noun(&self) -> String {
        self.label.to_lowercase()
    }
}

pub static CUSTOMERS: ResourceDef = ResourceDef {
    path_segment: "customers",
    table_name: "customers",
    id_column: "id",
    name_column: "name",
    value_column: "tax_id",
    value_field: "taxId",
    value_kind: ValueKind::Integer,
    unique_value: true,
    label: "Customer",
};

pub static PRODUCTS: ResourceDef = ResourceDef {
    path_segment: "products",
    table_name: "products",
    id_column: "id",
    name_column: "name",
    value_column: "price",
    value_field: "price",
    value_kind: ValueKind::Decimal,
    unique_value: false,
    label: "Product",
};

/// All resources mounted by the router and created by `ensure_tables`.
pub static RESOURCES: [&ResourceDef; 2] = [&CUSTOMERS, &PRODUCTS];
