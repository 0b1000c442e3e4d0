//! Pizza menu data and bill calculation.
//!
//! The menu ships with the binary; prices are shared across locales while
//! names, descriptions, and size labels are localized. Slot values arrive
//! as the localized size words, so price lookup goes through the labels.

use shared::{Error, Locale, Result};

/// Sales tax applied to every order.
pub const TAX_RATE: f64 = 1.13;

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub name: &'static str,
    pub description: &'static str,
    /// Prices for small, medium, large, extra-large.
    pub prices: [f64; 4],
}

#[derive(Debug, Clone, Copy)]
pub struct SizeLabels {
    pub small: &'static str,
    pub medium: &'static str,
    pub large: &'static str,
    pub extra_large: &'static str,
}

impl SizeLabels {
    fn index_of(&self, label: &str) -> Option<usize> {
        [self.small, self.medium, self.large, self.extra_large]
            .iter()
            .position(|known| known.eq_ignore_ascii_case(label))
    }
}

/// Localized size words, matching the bot's size slot values.
pub fn size_labels(locale: Locale) -> SizeLabels {
    match locale {
        Locale::FrFr => SizeLabels {
            small: "petit",
            medium: "moyen",
            large: "grand",
            extra_large: "très grand",
        },
        Locale::EsUs => SizeLabels {
            small: "pequeña",
            medium: "mediana",
            large: "grande",
            extra_large: "extra grande",
        },
        Locale::ItIt => SizeLabels {
            small: "piccola",
            medium: "media",
            large: "grande",
            extra_large: "extra grande",
        },
        Locale::DeDe => SizeLabels {
            small: "klein",
            medium: "mittel",
            large: "groß",
            extra_large: "extra groß",
        },
        Locale::JaJp => SizeLabels {
            small: "S",
            medium: "M",
            large: "L",
            extra_large: "XL",
        },
        _ => SizeLabels {
            small: "small",
            medium: "medium",
            large: "large",
            extra_large: "extra large",
        },
    }
}

const PRICES_MARGHERITA: [f64; 4] = [8.99, 11.99, 14.99, 17.99];
const PRICES_PEPPERONI: [f64; 4] = [9.99, 12.99, 15.99, 18.99];
const PRICES_VEGETARIAN: [f64; 4] = [9.49, 12.49, 15.49, 18.49];
const PRICES_HAWAIIAN: [f64; 4] = [10.49, 13.49, 16.49, 19.49];

/// The menu in the given locale. Lex only delivers its own bot locales;
/// anything else reads the English menu.
pub fn menu(locale: Locale) -> &'static [MenuItem] {
    match locale {
        Locale::FrFr => &[
            MenuItem {
                name: "Margherita",
                description: "sauce tomate, mozzarella et basilic",
                prices: PRICES_MARGHERITA,
            },
            MenuItem {
                name: "Pepperoni",
                description: "pepperoni et mozzarella",
                prices: PRICES_PEPPERONI,
            },
            MenuItem {
                name: "Végétarienne",
                description: "poivrons, champignons, oignons et olives",
                prices: PRICES_VEGETARIAN,
            },
            MenuItem {
                name: "Hawaïenne",
                description: "jambon et ananas",
                prices: PRICES_HAWAIIAN,
            },
        ],
        Locale::EsUs => &[
            MenuItem {
                name: "Margarita",
                description: "salsa de tomate, mozzarella y albahaca",
                prices: PRICES_MARGHERITA,
            },
            MenuItem {
                name: "Pepperoni",
                description: "pepperoni y mozzarella",
                prices: PRICES_PEPPERONI,
            },
            MenuItem {
                name: "Vegetariana",
                description: "pimientos, champiñones, cebolla y aceitunas",
                prices: PRICES_VEGETARIAN,
            },
            MenuItem {
                name: "Hawaiana",
                description: "jamón y piña",
                prices: PRICES_HAWAIIAN,
            },
        ],
        Locale::ItIt => &[
            MenuItem {
                name: "Margherita",
                description: "pomodoro, mozzarella e basilico",
                prices: PRICES_MARGHERITA,
            },
            MenuItem {
                name: "Pepperoni",
                description: "salame piccante e mozzarella",
                prices: PRICES_PEPPERONI,
            },
            MenuItem {
                name: "Vegetariana",
                description: "peperoni, funghi, cipolle e olive",
                prices: PRICES_VEGETARIAN,
            },
            MenuItem {
                name: "Hawaiana",
                description: "prosciutto e ananas",
                prices: PRICES_HAWAIIAN,
            },
        ],
        Locale::DeDe => &[
            MenuItem {
                name: "Margherita",
                description: "Tomatensauce, Mozzarella und Basilikum",
                prices: PRICES_MARGHERITA,
            },
            MenuItem {
                name: "Pepperoni",
                description: "Pepperoni und Mozzarella",
                prices: PRICES_PEPPERONI,
            },
            MenuItem {
                name: "Vegetarisch",
                description: "Paprika, Pilze, Zwiebeln und Oliven",
                prices: PRICES_VEGETARIAN,
            },
            MenuItem {
                name: "Hawaii",
                description: "Schinken und Ananas",
                prices: PRICES_HAWAIIAN,
            },
        ],
        Locale::JaJp => &[
            MenuItem {
                name: "マルゲリータ",
                description: "トマトソース、モッツァレラ、バジル",
                prices: PRICES_MARGHERITA,
            },
            MenuItem {
                name: "ペパロニ",
                description: "ペパロニとモッツァレラ",
                prices: PRICES_PEPPERONI,
            },
            MenuItem {
                name: "ベジタリアン",
                description: "ピーマン、マッシュルーム、玉ねぎ、オリーブ",
                prices: PRICES_VEGETARIAN,
            },
            MenuItem {
                name: "ハワイアン",
                description: "ハムとパイナップル",
                prices: PRICES_HAWAIIAN,
            },
        ],
        _ => &[
            MenuItem {
                name: "Margherita",
                description: "tomato sauce, mozzarella and basil",
                prices: PRICES_MARGHERITA,
            },
            MenuItem {
                name: "Pepperoni",
                description: "pepperoni and mozzarella",
                prices: PRICES_PEPPERONI,
            },
            MenuItem {
                name: "Vegetarian",
                description: "peppers, mushrooms, onions and olives",
                prices: PRICES_VEGETARIAN,
            },
            MenuItem {
                name: "Hawaiian",
                description: "ham and pineapple",
                prices: PRICES_HAWAIIAN,
            },
        ],
    }
}

/// Total bill for an order, tax included, rendered with two decimals.
pub fn calculate_bill(
    locale: Locale,
    pizza_type: &str,
    pizza_size: &str,
    pizza_count: &str,
) -> Result<String> {
    let item = menu(locale)
        .iter()
        .find(|item| item.name.eq_ignore_ascii_case(pizza_type))
        .ok_or_else(|| Error::Validation(format!("{pizza_type:?} is not on the menu")))?;

    let size_index = size_labels(locale)
        .index_of(pizza_size)
        .ok_or_else(|| Error::Validation(format!("{pizza_size:?} is not a known size")))?;

    let count: f64 = pizza_count
        .parse()
        .map_err(|_| Error::Validation(format!("{pizza_count:?} is not a valid count")))?;

    let total = item.prices[size_index] * count * TAX_RATE;
    Ok(format!("{total:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_includes_tax_and_count() {
        // 15.99 * 2 * 1.13 = 36.1374
        let bill = calculate_bill(Locale::EnUs, "Pepperoni", "large", "2").unwrap();
        assert_eq!(bill, "36.14");
    }

    #[test]
    fn size_lookup_is_case_insensitive() {
        let bill = calculate_bill(Locale::EnUs, "margherita", "Small", "1").unwrap();
        assert_eq!(bill, "10.16");
    }

    #[test]
    fn localized_sizes_price_the_same_item() {
        let english = calculate_bill(Locale::EnUs, "Pepperoni", "medium", "1").unwrap();
        let french = calculate_bill(Locale::FrFr, "Pepperoni", "moyen", "1").unwrap();
        assert_eq!(english, french);
    }

    #[test]
    fn unknown_item_or_size_is_rejected() {
        assert!(matches!(
            calculate_bill(Locale::EnUs, "Calzone", "small", "1"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            calculate_bill(Locale::EnUs, "Pepperoni", "gigantic", "1"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            calculate_bill(Locale::EnUs, "Pepperoni", "small", "a few"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn every_lex_locale_has_a_full_menu() {
        for locale in Locale::LEX {
            assert_eq!(menu(locale).len(), 4, "menu incomplete for {locale}");
        }
    }
}
