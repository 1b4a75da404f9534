//! Default storefront catalog, used to populate an empty shop.

use rust_decimal::Decimal;

use sweetshop_core::DomainResult;

use crate::{Category, NewItem, Price};

const DEFAULT_CATALOG: &[(&str, &str, Category, i64, i64, &str)] = &[
    ("Ajmeera Kalakandh", "Traditional milk-based sweet with rich flavor", Category::Sweets, 450, 10, "/sweetsImgs/AjmeeaKalakandh.jpg"),
    ("Ariselu", "Classic rice flour sweet made with jaggery", Category::Sweets, 320, 12, "/sweetsImgs/Ariselu.jpg"),
    ("Badusha", "Deep-fried flaky sweet soaked in sugar syrup", Category::Sweets, 280, 15, "/sweetsImgs/Badusha.jpg"),
    ("Basen Ladoo", "Traditional besan flour ladoo with ghee", Category::Sweets, 350, 10, "/sweetsImgs/BasenLadoo.jpg"),
    ("Brittle Candy", "Crunchy caramelized sugar candy", Category::Snacks, 180, 20, "/sweetsImgs/BrittleCandy.jpg"),
    ("Chakkara Rekulu", "Traditional Andhra sweet rice crackers", Category::Sweets, 380, 12, "/sweetsImgs/ChakkaraRekulu.jpg"),
    ("Coconut Burfi", "Rich coconut fudge with cardamom flavor", Category::Sweets, 300, 15, "/sweetsImgs/cocnutburfi.jpg"),
    ("Coconut Ladoo", "Sweet coconut balls with condensed milk", Category::Sweets, 280, 18, "/sweetsImgs/CocnutLadoo.jpg"),
    ("Community Special", "Assorted premium sweets collection box", Category::GiftBoxes, 1200, 5, "/sweetsImgs/Community.jpg"),
    ("Dryfruit Basen Ladoo", "Premium besan ladoo loaded with dry fruits", Category::PremiumSweets, 550, 8, "/sweetsImgs/DryfruitBasenLadoo.jpg"),
    ("Gaja Halwa", "Rich carrot halwa with nuts and khoya", Category::Sweets, 400, 10, "/sweetsImgs/GajaHalwa.jpg"),
    ("Gond Ke Ladoo", "Nutritious edible gum ladoo with ghee", Category::PremiumSweets, 480, 7, "/sweetsImgs/gond ke Ladoo.jpg"),
    ("Ice Cream Burfi", "Creamy milk burfi with ice cream flavor", Category::PremiumSweets, 420, 12, "/sweetsImgs/IceCreamBurfi.jpg"),
    ("Jalebi", "Crispy spiral-shaped sweet soaked in syrup", Category::Sweets, 250, 25, "/sweetsImgs/Jalebi.jpg"),
    ("Kalakand", "Soft milk cake with cardamom and pistachios", Category::Sweets, 380, 10, "/sweetsImgs/Kalakand.jpg"),
    ("Mawa Malpua", "Traditional fried pancakes with mawa topping", Category::Sweets, 350, 15, "/sweetsImgs/Mawa Malpua.jpg"),
    ("Pure Ghee Sweets", "Assorted sweets made with pure desi ghee", Category::PremiumSweets, 600, 8, "/sweetsImgs/PureGhee.jpg"),
    ("Rasmalai", "Soft cottage cheese dumplings in sweetened milk", Category::Sweets, 450, 12, "/sweetsImgs/Rasmalai.jpg"),
    ("Shahi Tukra", "Royal bread pudding with rabri and nuts", Category::PremiumSweets, 380, 10, "/sweetsImgs/ShahiTukra.jpg"),
    ("Til Patti", "Sesame seed brittle with jaggery", Category::Snacks, 200, 20, "/sweetsImgs/TilPatti.jpg"),
    ("Traditional Sweets Box", "Curated box of traditional Indian sweets", Category::GiftBoxes, 1500, 5, "/sweetsImgs/TraditionalSweets.jpg"),
];

/// The default catalog, keyed by name (names are unique).
pub fn default_catalog() -> DomainResult<Vec<NewItem>> {
    DEFAULT_CATALOG
        .iter()
        .map(|&(name, description, category, rupees, quantity, image)| {
            Ok(NewItem {
                name: name.to_string(),
                description: Some(description.to_string()),
                category,
                // Whole rupees, stored with two decimal places.
                price: Price::new(Decimal::new(rupees * 100, 2))?,
                quantity,
                image_url: Some(image.to_string()),
            })
        })
        .collect()
}
