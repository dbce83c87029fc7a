mod lookups;
mod mysql;
mod sqlite;
