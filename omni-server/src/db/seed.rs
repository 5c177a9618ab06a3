//! Catalog seed data
//!
//! - `demo()`: fine-dining sample used by sandbox sessions and resets
//! - `starter()`: minimal menu for freshly provisioned tenants

#[derive(Debug, Clone)]
pub struct SeedOption {
    pub name: &'static str,
    pub price_adjustment: i64,
}

#[derive(Debug, Clone)]
pub struct SeedGroup {
    pub name: &'static str,
    pub min_selection: i32,
    pub max_selection: i32,
    pub options: Vec<SeedOption>,
}

#[derive(Debug, Clone)]
pub struct SeedItem {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub price: i64,
    pub image_url: Option<&'static str>,
    pub groups: Vec<SeedGroup>,
}

#[derive(Debug, Clone)]
pub struct SeedCategory {
    pub name: &'static str,
    pub rank: i32,
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Clone)]
pub struct CatalogSeed {
    pub categories: Vec<SeedCategory>,
}

fn item(name: &'static str, description: &'static str, price: i64) -> SeedItem {
    SeedItem {
        name,
        description: Some(description),
        price,
        image_url: None,
        groups: Vec::new(),
    }
}

fn option(name: &'static str, price_adjustment: i64) -> SeedOption {
    SeedOption {
        name,
        price_adjustment,
    }
}

impl CatalogSeed {
    pub fn demo() -> Self {
        let mut burger = item(
            "Iron Skillet Burger",
            "Dry-aged beef, gruyère, caramelized onion, brioche",
            1800,
        );
        burger.groups = vec![
            SeedGroup {
                name: "Preparation",
                min_selection: 1,
                max_selection: 1,
                options: vec![
                    option("Medium Rare", 0),
                    option("Medium", 0),
                    option("Well Done", 0),
                ],
            },
            SeedGroup {
                name: "Add-ons",
                min_selection: 0,
                max_selection: 3,
                options: vec![
                    option("Bacon", 250),
                    option("Fried Egg", 150),
                    option("Avocado", 200),
                ],
            },
        ];

        Self {
            categories: vec![
                SeedCategory {
                    name: "Mains",
                    rank: 1,
                    items: vec![
                        burger,
                        item(
                            "Miso Glazed Salmon",
                            "Charred bok choy, jasmine rice",
                            2400,
                        ),
                        item(
                            "Truffle Mushroom Risotto",
                            "Arborio, wild mushrooms, parmesan",
                            2100,
                        ),
                    ],
                },
                SeedCategory {
                    name: "Sides",
                    rank: 2,
                    items: vec![item("Hand-cut Fries", "Sea salt, rosemary", 600)],
                },
                SeedCategory {
                    name: "Drinks",
                    rank: 3,
                    items: vec![item("Sparkling Lemonade", "House-made", 450)],
                },
            ],
        }
    }

    pub fn starter() -> Self {
        Self {
            categories: vec![
                SeedCategory {
                    name: "Burgers",
                    rank: 1,
                    items: vec![item("OmniBurger", "Signature double patty", 1400)],
                },
                SeedCategory {
                    name: "Sides",
                    rank: 2,
                    items: vec![item("Truffle Fries", "Parmesan, truffle oil", 600)],
                },
                SeedCategory {
                    name: "Drinks",
                    rank: 3,
                    items: vec![item("Vanilla Shake", "Madagascar vanilla", 500)],
                },
            ],
        }
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}
