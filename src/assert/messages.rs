//! Canned failure messages

pub const IS: &str = "Expected `value` (-) to be strictly equal to `expected` (+):";
pub const IS_COMPOSITE: &str = "Expected `value` to be strictly equal to `expected`.";
pub const EQUAL: &str = "Expected `value` (-) to deeply equal `expected` (+):";
pub const THROWS_MISSING: &str =
    "The operation was supposed to return an error, it looks like it did not.";
pub const THROWS_MESSAGE: &str =
    "It looks like the error message does not contain or match `expected`:";
pub const THROWS_PREDICATE: &str =
    "The `expected` predicate should return true if everything is okay.";
