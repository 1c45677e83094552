//! Remote record acquisition.

pub mod openfoodfacts;
