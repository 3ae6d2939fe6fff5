use crate::model::{Listing, Product};

/// Index and routing key for a manufacturer name.
pub fn manufacturer_key(name: &str) -> String {
    name.to_lowercase()
}

pub fn product_key(product: &Product) -> String {
    manufacturer_key(&product.manufacturer)
}

pub fn listing_key(listing: &Listing) -> String {
    manufacturer_key(&listing.manufacturer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_lowercase_and_keep_spacing() {
        assert_eq!(manufacturer_key("Hewlett Packard"), "hewlett packard");
        assert_eq!(manufacturer_key("FUJIFILM"), "fujifilm");
        assert_eq!(manufacturer_key(""), "");
    }
}
