//! SQL statements issued by the provisioning job

/// Quote a PostgreSQL identifier: wrap in double quotes, double embedded
/// quotes and drop NUL bytes
pub fn quote_identifier(ident: &str) -> String {
    let escaped = ident.replace('\0', "").replace('"', "\"\"");
    format!("\"{escaped}\"")
}

/// Takes the role name as `$1`
pub const ROLE_EXISTS_SQL: &str = "SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)";

/// Takes role name, principal object ID and principal type as `$1..$3`
pub const CREATE_AAD_PRINCIPAL_SQL: &str =
    "SELECT * FROM pgaadauth_create_principal_with_oid($1, $2, $3, false, false)";

/// Principal type passed to `pgaadauth_create_principal_with_oid`
pub const AAD_PRINCIPAL_TYPE: &str = "service";

pub fn create_role_sql(user: &str) -> String {
    format!("CREATE ROLE {} LOGIN;", quote_identifier(user))
}

pub fn grant_connect_sql(db_name: &str, user: &str) -> String {
    format!(
        "GRANT CONNECT ON DATABASE {} TO {};",
        quote_identifier(db_name),
        quote_identifier(user)
    )
}

pub fn create_schema_sql(schema: &str, user: &str) -> String {
    format!(
        "CREATE SCHEMA IF NOT EXISTS {} AUTHORIZATION {};",
        quote_identifier(schema),
        quote_identifier(user)
    )
}

pub fn alter_schema_owner_sql(schema: &str, user: &str) -> String {
    format!(
        "ALTER SCHEMA {} OWNER TO {};",
        quote_identifier(schema),
        quote_identifier(user)
    )
}

pub fn set_search_path_sql(user: &str, schema: &str) -> String {
    format!(
        "ALTER ROLE {} SET search_path = {}, public;",
        quote_identifier(user),
        quote_identifier(schema)
    )
}
