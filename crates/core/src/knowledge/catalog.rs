use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub keywords: Vec<String>,
}

/// Product lookup by id or by any associated keyword.
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn with_builtin_products() -> Self {
        Self {
            products: vec![
                product(
                    "laptop_pro",
                    "Laptop Pro",
                    Decimal::new(129999, 2),
                    &["laptop", "computer", "notebook", "portatil", "computadora"],
                ),
                product(
                    "smartphone_x",
                    "Smartphone X",
                    Decimal::new(79999, 2),
                    &["smartphone", "phone", "mobile", "telefono", "movil"],
                ),
                product(
                    "headphones_wireless",
                    "Wireless Headphones",
                    Decimal::new(19999, 2),
                    &["headphones", "earbuds", "auriculares", "audifonos"],
                ),
            ],
        }
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn by_id(&self, id: &str) -> Option<&Product> {
        let normalized = normalize_keyword(id);
        self.products.iter().find(|product| product.id.0 == normalized)
    }

    pub fn find_by_keyword(&self, keyword: &str) -> Option<&Product> {
        let normalized = normalize_keyword(keyword);
        if normalized.is_empty() {
            return None;
        }

        self.products.iter().find(|product| {
            product.id.0 == normalized
                || product.keywords.iter().any(|candidate| candidate == &normalized)
        })
    }
}

fn product(id: &str, name: &str, price: Decimal, keywords: &[&str]) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        price,
        keywords: keywords.iter().map(|keyword| (*keyword).to_string()).collect(),
    }
}

fn normalize_keyword(keyword: &str) -> String {
    keyword
        .trim()
        .to_lowercase()
        .chars()
        .map(|character| match character {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ProductCatalog;

    #[test]
    fn finds_product_by_keyword() {
        let catalog = ProductCatalog::with_builtin_products();
        let laptop = catalog.find_by_keyword("laptop").expect("laptop keyword should match");
        assert_eq!(laptop.id.0, "laptop_pro");
        assert_eq!(laptop.price, Decimal::new(129999, 2));
    }

    #[test]
    fn accented_keywords_match_after_normalization() {
        let catalog = ProductCatalog::with_builtin_products();
        let phone = catalog.find_by_keyword("teléfono").expect("accented keyword should match");
        assert_eq!(phone.id.0, "smartphone_x");
    }

    #[test]
    fn id_lookup_matches_exactly() {
        let catalog = ProductCatalog::with_builtin_products();
        assert!(catalog.by_id("headphones_wireless").is_some());
        assert!(catalog.by_id("tablet_mini").is_none());
    }

    #[test]
    fn unknown_keyword_matches_nothing() {
        let catalog = ProductCatalog::with_builtin_products();
        assert!(catalog.find_by_keyword("toaster").is_none());
        assert!(catalog.find_by_keyword("").is_none());
    }
}
