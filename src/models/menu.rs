use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MenuCategory {
    Starters,
    MainCourse,
    Breads,
    Desserts,
    Beverages,
}

impl std::fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuCategory::Starters => write!(f, "starters"),
            MenuCategory::MainCourse => write!(f, "main course"),
            MenuCategory::Breads => write!(f, "breads"),
            MenuCategory::Desserts => write!(f, "desserts"),
            MenuCategory::Beverages => write!(f, "beverages"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image: String,
    pub category: MenuCategory,
    pub vegetarian: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// The house menu shipped with the app.
    pub fn default_catalog() -> Self {
        use MenuCategory::*;

        let entries: [(&str, &str, &str, f64, MenuCategory, bool); 12] = [
            ("paneer-tikka", "Paneer Tikka", "Chargrilled cottage cheese with peppers", 280.0, Starters, true),
            ("chicken-65", "Chicken 65", "Spicy deep-fried chicken with curry leaves", 320.0, Starters, false),
            ("veg-spring-roll", "Veg Spring Roll", "Crisp rolls with seasoned vegetables", 180.0, Starters, true),
            ("butter-chicken", "Butter Chicken", "Tandoori chicken in tomato butter gravy", 420.0, MainCourse, false),
            ("dal-makhani", "Dal Makhani", "Black lentils slow-cooked overnight", 260.0, MainCourse, true),
            ("veg-biryani", "Veg Biryani", "Basmati rice layered with vegetables and saffron", 300.0, MainCourse, true),
            ("butter-naan", "Butter Naan", "Leavened bread from the tandoor", 60.0, Breads, true),
            ("garlic-naan", "Garlic Naan", "Naan topped with garlic and coriander", 75.0, Breads, true),
            ("gulab-jamun", "Gulab Jamun", "Milk dumplings in rose syrup", 120.0, Desserts, true),
            ("rasmalai", "Rasmalai", "Cottage cheese discs in saffron milk", 150.0, Desserts, true),
            ("masala-chai", "Masala Chai", "Spiced milk tea", 50.0, Beverages, true),
            ("mango-lassi", "Mango Lassi", "Yogurt smoothie with Alphonso mango", 110.0, Beverages, true),
        ];

        let items = entries
            .into_iter()
            .map(|(id, name, description, price, category, vegetarian)| MenuItem {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                price,
                image: format!("/images/menu/{}.jpg", id),
                category,
                vegetarian,
            })
            .collect();

        Self { items }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn by_category(&self, category: MenuCategory) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }
}
