pub mod expr;
pub mod lookup;
pub mod operators;
pub mod path;
pub mod values;

pub use self::expr::Expr;
pub use self::lookup::{Lookup, Rhs};
pub use self::operators::{LookupKind, SortOrder};
pub use self::path::{PathSegment, compile_json_path};
pub use self::values::Value;
