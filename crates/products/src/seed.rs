//! Sample catalog inserted into an empty store on first start.

use crate::product::ProductCreate;

/// The fixed five-item catalog used to seed an empty store.
pub fn initial_products() -> Vec<ProductCreate> {
    vec![
        ProductCreate::new(
            "Apple iPhone 15 Pro Max",
            "6.7-inch OLED display, A17 Pro chip, 256GB storage, triple-camera system",
            1299.99,
            25,
        ),
        ProductCreate::new(
            "Samsung Galaxy S24 Ultra",
            "6.8-inch AMOLED 120Hz display, Snapdragon 8 Gen 3, 12GB RAM, 512GB storage",
            1199.99,
            30,
        ),
        ProductCreate::new(
            "Google Pixel 8 Pro",
            "6.7-inch LTPO OLED display, Google Tensor G3, 128GB storage, AI camera",
            999.99,
            20,
        ),
        ProductCreate::new(
            "OnePlus 12",
            "6.82-inch 120Hz AMOLED, Snapdragon 8 Gen 3, 16GB RAM, 512GB storage",
            899.99,
            35,
        ),
        ProductCreate::new(
            "Xiaomi 14 Pro",
            "6.73-inch QHD+ AMOLED, Snapdragon 8 Gen 3, Leica cameras",
            799.99,
            40,
        ),
    ]
}
