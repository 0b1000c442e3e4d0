//! Localized messages for the pizza order dialog.
//!
//! Lex only delivers its own bot locales; any other locale reads the
//! English strings.

use shared::storage::LastOrder;
use shared::Locale;

use crate::menu::{menu, size_labels};

/// Menu listing, optionally prefixed with the welcome message, ending with
/// the pizza-type question.
pub fn menu_message(locale: Locale, include_welcome: bool) -> String {
    let welcome = match locale {
        Locale::FrFr => "Bienvenue dans notre service de commande de pizza. ",
        Locale::EsUs => "Bienvenido a nuestro servicio de pedidos de pizza. ",
        Locale::ItIt => "Benvenuti nel nostro servizio di ordinazione di pizze. ",
        Locale::DeDe => "Willkommen bei unserem Pizza-Bestellservice. ",
        Locale::JaJp => "ピザ注文サービスへようこそ。",
        _ => "Welcome to our Pizza Ordering Service. ",
    };
    let menu_intro = match locale {
        Locale::FrFr => "Notre menu Pizza comprend: ",
        Locale::EsUs => "Nuestro menú de Pizza incluye: ",
        Locale::ItIt => "Il nostro menù Pizza comprende: ",
        Locale::DeDe => "Unsere Pizza-Speisekarte beinhaltet: ",
        Locale::JaJp => "ピザメニューには以下が含まれます: ",
        _ => "Our Pizza menu includes: ",
    };
    let question = match locale {
        Locale::FrFr => "Quel type de pizza souhaitez-vous?",
        Locale::EsUs => "¿Qué tipo de pizza te gustaría?",
        Locale::ItIt => "Che tipo di pizza vorresti?",
        Locale::DeDe => "Welche Art von Pizza möchten Sie?",
        Locale::JaJp => "どのピザを注文されますか？",
        _ => "What type of pizza would you like?",
    };
    let price_word = match locale {
        Locale::FrFr => "Prix",
        Locale::EsUs => "Precio",
        Locale::ItIt => "Prezzo",
        Locale::DeDe => "Preis",
        Locale::JaJp => "価格",
        _ => "Price",
    };

    let sizes = size_labels(locale);
    let mut message = String::new();
    if include_welcome {
        message.push_str(welcome);
    }
    message.push_str(menu_intro);
    for item in menu(locale) {
        let [small, medium, large, extra_large] = item.prices;
        message.push_str(&format!(
            "{} ({}). {} ({}: {:.2}, {}: {:.2}, {}: {:.2}, {}: {:.2}). ",
            item.name,
            item.description,
            price_word,
            sizes.small,
            small,
            sizes.medium,
            medium,
            sizes.large,
            large,
            sizes.extra_large,
            extra_large,
        ));
    }
    message.push_str(question);
    message
}

/// Offer to repeat the customer's previous order.
pub fn repeat_message(locale: Locale, last_order: &LastOrder) -> String {
    let LastOrder {
        pizza_type,
        pizza_size,
        pizza_crust,
        pizza_count,
    } = last_order;

    match locale {
        Locale::EsUs => format!(
            "Bienvenido de nuevo a nuestro servicio de pedidos de pizza. ¿Le gustaría hacer el mismo pedido que el último? Tipo: {pizza_type}, Tamaño: {pizza_size}, Número de pizzas: {pizza_count}, y Corteza: {pizza_crust}, ¿(sí o no)?"
        ),
        Locale::FrFr => format!(
            "Bienvenue à notre service de commande de pizza. Souhaitez-vous commander la même commande que votre dernière? Type: {pizza_type}, Taille: {pizza_size}, Nombre de pizzas: {pizza_count}, et croûte: {pizza_crust}, (oui ou non)?"
        ),
        Locale::ItIt => format!(
            "Bentornati al nostro servizio di ordinazione di pizze. Vorresti ordinare lo stesso ordine del tuo ultimo? Tipo: {pizza_type}, Taglia: {pizza_size}, Numero di pizze: {pizza_count}, e Crosta: {pizza_crust}, (sì o no)?"
        ),
        Locale::DeDe => format!(
            "Willkommen zurück bei unserem Pizza-Bestellservice. Möchten Sie die gleiche Bestellung wie Ihre letzte bestellen? Art: {pizza_type}, Größe: {pizza_size}, Anzahl der Pizzen: {pizza_count}, und Kruste: {pizza_crust}, (ja oder nein)?"
        ),
        Locale::JaJp => format!(
            "ピザ注文サービスへようこそ。前回と同じ注文をしますか？ タイプ：{pizza_type}、サイズ：{pizza_size}、ピザの数：{pizza_count}、クラスト：{pizza_crust}、（はいまたはいいえ）？"
        ),
        _ => format!(
            "Welcome back to our Pizza Ordering Service. Would you like to order the same order as your last one? Type: {pizza_type}, Size: {pizza_size}, Number of Pizzas: {pizza_count}, and Crust: {pizza_crust}, (yes or no)?"
        ),
    }
}

/// Order summary presented before placing the order.
pub fn confirmation_message(
    locale: Locale,
    pizza_type: &str,
    pizza_size: &str,
    pizza_count: &str,
    pizza_crust: &str,
) -> String {
    match locale {
        Locale::EsUs => format!(
            "A continuación se muestra un resumen de su pedido. Tipo: {pizza_type}, Tamaño: {pizza_size}, Número de pizzas: {pizza_count}, y Corteza: {pizza_crust}. ¿Le gustaría realizar su pedido (sí o no)?"
        ),
        Locale::FrFr => format!(
            "Voici un récapitulatif de votre commande. Type: {pizza_type}, Taille: {pizza_size}, Nombre de pizzas: {pizza_count}, et croûte: {pizza_crust}. Souhaitez-vous passer votre commande (oui ou non)?"
        ),
        Locale::ItIt => format!(
            "Ecco un riepilogo del tuo ordine. Tipo: {pizza_type}, Taglia: {pizza_size}, Numero di pizze: {pizza_count}, e Crosta: {pizza_crust}. Vorresti effettuare l'ordine, (sì o no)?"
        ),
        Locale::DeDe => format!(
            "Hier ist eine Zusammenfassung Ihrer Bestellung. Art: {pizza_type}, Größe: {pizza_size}, Anzahl der Pizzen: {pizza_count}, und Kruste: {pizza_crust}. Möchten Sie Ihre Bestellung aufgeben (ja oder nein)?"
        ),
        Locale::JaJp => format!(
            "こちらがご注文の概要です。 タイプ：{pizza_type}、サイズ：{pizza_size}、ピザの数：{pizza_count}、クラスト：{pizza_crust}。 注文しますか（はい、いいえ）？"
        ),
        _ => format!(
            "Here is a summary of your order. Type: {pizza_type}, Size: {pizza_size}, Number of Pizzas: {pizza_count}, and Crust: {pizza_crust}. Would you like to place your order, (yes or no)?"
        ),
    }
}

/// Order placed; quote the order number and the taxed total.
pub fn fulfilled_message(locale: Locale, order_id: &str, total_bill: &str) -> String {
    match locale {
        Locale::EsUs => format!(
            "Su orden ha sido puesta. Aquí está el número de pedido: {order_id}. Su factura total, incluidos los impuestos, es ${total_bill}. ¡Gracias por usar nuestro servicio!"
        ),
        Locale::FrFr => format!(
            "Votre commande a bien été reçue. Voici le numéro de commande: {order_id}. Votre facture totale, taxes comprises, est ${total_bill}. Merci d'utiliser notre service!"
        ),
        Locale::ItIt => format!(
            "Il tuo ordine è stato inoltrato. Ecco il numero dell'ordine: {order_id}. Il conto totale comprensivo di tasse è ${total_bill}. Grazie per aver utilizzato il nostro servizio!"
        ),
        Locale::DeDe => format!(
            "Deine Bestellung wurde aufgenommen. Hier ist die Bestellnummer: {order_id}. Ihre Gesamtrechnung einschließlich Steuern beträgt ${total_bill}. Vielen Dank, dass Sie unseren Service nutzen!"
        ),
        Locale::JaJp => format!(
            "ご注文は完了しました。 注文番号は次のとおりです：{order_id}。 税込みの合計請求額は${total_bill}です。 私たちのサービスをご利用いただきありがとうございます！"
        ),
        _ => format!(
            "Your order has been placed. Here is the order's number: {order_id}. Your total bill, including tax, is ${total_bill}. Thank you for using our service!"
        ),
    }
}

/// Order cancelled.
pub fn cancel_message(locale: Locale) -> &'static str {
    match locale {
        Locale::EsUs => "Tu pedido ha sido cancelado. ¡Gracias!",
        Locale::FrFr => "Votre commande a été annulée. Je vous remercie!",
        Locale::ItIt => "Il tuo ordine è stato annullato. Grazie!",
        Locale::DeDe => "Ihre Bestellung wurde storniert. Dankeschön!",
        Locale::JaJp => "ご注文はキャンセルされました。 ありがとうございました！",
        _ => "Your order has been cancelled. Thank you!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_message_lists_every_item_and_asks_for_a_type() {
        let message = menu_message(Locale::EnUs, true);
        assert!(message.starts_with("Welcome to our Pizza Ordering Service. "));
        for item in menu(Locale::EnUs) {
            assert!(message.contains(item.name), "menu misses {}", item.name);
        }
        assert!(message.ends_with("What type of pizza would you like?"));
    }

    #[test]
    fn menu_message_can_skip_the_welcome() {
        let message = menu_message(Locale::EnUs, false);
        assert!(message.starts_with("Our Pizza menu includes: "));
    }

    #[test]
    fn repeat_message_quotes_the_last_order() {
        let last = LastOrder {
            pizza_type: "Pepperoni".to_string(),
            pizza_size: "large".to_string(),
            pizza_crust: "thin".to_string(),
            pizza_count: "2".to_string(),
        };
        let message = repeat_message(Locale::EnUs, &last);
        assert!(message.contains("Type: Pepperoni"));
        assert!(message.contains("Number of Pizzas: 2"));
        assert!(message.ends_with("(yes or no)?"));
    }

    #[test]
    fn fulfilled_message_quotes_order_number_and_bill() {
        let message = fulfilled_message(Locale::DeDe, "1234-5678-9012-3456", "36.14");
        assert!(message.contains("1234-5678-9012-3456"));
        assert!(message.contains("$36.14"));
    }
}
