//! services/language_service.rs
//! Catálogo de textos del IVR por idioma.

use std::collections::BTreeMap;

const NAME_PLACEHOLDER: &str = "{name}";

/// Textos hablados de un idioma. `welcome` lleva el placeholder `{name}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub welcome: String,
    pub main_menu: String,
    pub press_for_info: String,
    pub press_to_opt_out: String,
    pub press_to_repeat: String,
    pub thank_you: String,
    pub goodbye: String,
    pub invalid_input: String,
    pub product_info: String,
    pub offer_details: String,
    pub opt_out_confirm: String,
    pub transfer_message: String,
}

impl PromptSet {
    /// Saludo con nombre; sin nombre se elimina "{name}, " de la plantilla.
    pub fn greeting(&self, customer_name: &str) -> String {
        let name = customer_name.trim();
        if name.is_empty() {
            self.welcome.replacen(&format!("{}, ", NAME_PLACEHOLDER), "", 1)
        } else {
            self.welcome.replacen(NAME_PLACEHOLDER, name, 1)
        }
    }
}

/// Tabla de solo lectura construida una vez al arrancar.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    prompts: BTreeMap<&'static str, PromptSet>,
    fallback: PromptSet,
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageCatalog {
    pub fn new() -> Self {
        let mut prompts = BTreeMap::new();
        prompts.insert("en", english());
        prompts.insert("es", spanish());
        prompts.insert("fr", french());
        prompts.insert("de", german());
        prompts.insert("hi", hindi());
        LanguageCatalog {
            prompts,
            fallback: english(),
        }
    }

    /// Nunca falla: códigos desconocidos caen en inglés.
    pub fn lookup(&self, code: &str) -> &PromptSet {
        self.prompts.get(code).unwrap_or(&self.fallback)
    }

    pub fn supported_codes(&self) -> Vec<String> {
        self.prompts.keys().map(|k| k.to_string()).collect()
    }
}

/// Código de voz que Twilio espera en `<Say language="...">`.
pub fn voice_locale(code: &str) -> &'static str {
    match code {
        "en" => "en-US",
        "es" => "es-ES",
        "fr" => "fr-FR",
        "de" => "de-DE",
        "hi" => "hi-IN",
        _ => "en-US",
    }
}

fn english() -> PromptSet {
    PromptSet {
        welcome: "Hello {name}, welcome to our marketing campaign.".into(),
        main_menu: "Press 1 for product information. Press 2 for special offers. Press 3 to opt out. Press 9 to repeat this menu.".into(),
        press_for_info: "Press 1 to hear more details or press 0 to return to the main menu.".into(),
        press_to_opt_out: "Press 1 to confirm opt out or press 0 to return to the main menu.".into(),
        press_to_repeat: "Press 9 to repeat the menu.".into(),
        thank_you: "Thank you for your time.".into(),
        goodbye: "Goodbye!".into(),
        invalid_input: "Sorry, that was not a valid option. Please try again.".into(),
        product_info: "Our new product offers cutting-edge features designed to improve your daily life. It includes advanced technology and user-friendly design.".into(),
        offer_details: "Special offer! Get 20 percent off on your first purchase. Use promo code WELCOME20 at checkout. Offer valid for 30 days.".into(),
        opt_out_confirm: "You have been successfully removed from our calling list. We apologize for any inconvenience.".into(),
        transfer_message: "Please hold while we transfer you to our customer service representative.".into(),
    }
}

fn spanish() -> PromptSet {
    PromptSet {
        welcome: "Hola {name}, bienvenido a nuestra campaña de marketing.".into(),
        main_menu: "Presione 1 para información del producto. Presione 2 para ofertas especiales. Presione 3 para excluirse. Presione 9 para repetir este menú.".into(),
        press_for_info: "Presione 1 para escuchar más detalles o presione 0 para volver al menú principal.".into(),
        press_to_opt_out: "Presione 1 para confirmar la exclusión o presione 0 para volver al menú principal.".into(),
        press_to_repeat: "Presione 9 para repetir el menú.".into(),
        thank_you: "Gracias por su tiempo.".into(),
        goodbye: "¡Adiós!".into(),
        invalid_input: "Lo sentimos, esa no fue una opción válida. Por favor, inténtelo de nuevo.".into(),
        product_info: "Nuestro nuevo producto ofrece características de vanguardia diseñadas para mejorar su vida diaria. Incluye tecnología avanzada y diseño fácil de usar.".into(),
        offer_details: "¡Oferta especial! Obtenga un 20 por ciento de descuento en su primera compra. Use el código promocional WELCOME20 al pagar. Oferta válida por 30 días.".into(),
        opt_out_confirm: "Ha sido eliminado exitosamente de nuestra lista de llamadas. Nos disculpamos por cualquier inconveniente.".into(),
        transfer_message: "Por favor espere mientras lo transferimos a nuestro representante de servicio al cliente.".into(),
    }
}

fn french() -> PromptSet {
    PromptSet {
        welcome: "Bonjour {name}, bienvenue dans notre campagne marketing.".into(),
        main_menu: "Appuyez sur 1 pour les informations sur le produit. Appuyez sur 2 pour les offres spéciales. Appuyez sur 3 pour vous désinscrire. Appuyez sur 9 pour répéter ce menu.".into(),
        press_for_info: "Appuyez sur 1 pour entendre plus de détails ou appuyez sur 0 pour revenir au menu principal.".into(),
        press_to_opt_out: "Appuyez sur 1 pour confirmer la désinscription ou appuyez sur 0 pour revenir au menu principal.".into(),
        press_to_repeat: "Appuyez sur 9 pour répéter le menu.".into(),
        thank_you: "Merci pour votre temps.".into(),
        goodbye: "Au revoir!".into(),
        invalid_input: "Désolé, ce n'était pas une option valide. Veuillez réessayer.".into(),
        product_info: "Notre nouveau produit offre des fonctionnalités de pointe conçues pour améliorer votre vie quotidienne. Il comprend une technologie avancée et une conception conviviale.".into(),
        offer_details: "Offre spéciale! Obtenez 20 pour cent de réduction sur votre premier achat. Utilisez le code promo WELCOME20 lors du paiement. Offre valable pendant 30 jours.".into(),
        opt_out_confirm: "Vous avez été supprimé avec succès de notre liste d'appels. Nous nous excusons pour tout inconvénient.".into(),
        transfer_message: "Veuillez patienter pendant que nous vous transférons à notre représentant du service client.".into(),
    }
}

fn german() -> PromptSet {
    PromptSet {
        welcome: "Hallo {name}, willkommen zu unserer Marketingkampagne.".into(),
        main_menu: "Drücken Sie 1 für Produktinformationen. Drücken Sie 2 für Sonderangebote. Drücken Sie 3, um sich abzumelden. Drücken Sie 9, um dieses Menü zu wiederholen.".into(),
        press_for_info: "Drücken Sie 1, um weitere Details zu hören, oder drücken Sie 0, um zum Hauptmenü zurückzukehren.".into(),
        press_to_opt_out: "Drücken Sie 1, um die Abmeldung zu bestätigen, oder drücken Sie 0, um zum Hauptmenü zurückzukehren.".into(),
        press_to_repeat: "Drücken Sie 9, um das Menü zu wiederholen.".into(),
        thank_you: "Vielen Dank für Ihre Zeit.".into(),
        goodbye: "Auf Wiedersehen!".into(),
        invalid_input: "Entschuldigung, das war keine gültige Option. Bitte versuchen Sie es erneut.".into(),
        product_info: "Unser neues Produkt bietet modernste Funktionen, die entwickelt wurden, um Ihr tägliches Leben zu verbessern. Es umfasst fortschrittliche Technologie und benutzerfreundliches Design.".into(),
        offer_details: "Sonderangebot! Erhalten Sie 20 Prozent Rabatt auf Ihren ersten Einkauf. Verwenden Sie den Promocode WELCOME20 beim Bezahlen. Angebot gültig für 30 Tage.".into(),
        opt_out_confirm: "Sie wurden erfolgreich von unserer Anrufliste entfernt. Wir entschuldigen uns für etwaige Unannehmlichkeiten.".into(),
        transfer_message: "Bitte warten Sie, während wir Sie zu unserem Kundendienstmitarbeiter verbinden.".into(),
    }
}

fn hindi() -> PromptSet {
    PromptSet {
        welcome: "नमस्ते {name}, हमारे मार्केटिंग अभियान में आपका स्वागत है।".into(),
        main_menu: "उत्पाद जानकारी के लिए 1 दबाएं। विशेष ऑफर के लिए 2 दबाएं। ऑप्ट आउट करने के लिए 3 दबाएं। इस मेनू को दोहराने के लिए 9 दबाएं।".into(),
        press_for_info: "अधिक विवरण सुनने के लिए 1 दबाएं या मुख्य मेनू पर वापस जाने के लिए 0 दबाएं।".into(),
        press_to_opt_out: "ऑप्ट आउट की पुष्टि करने के लिए 1 दबाएं या मुख्य मेनू पर वापस जाने के लिए 0 दबाएं।".into(),
        press_to_repeat: "मेनू को दोहराने के लिए 9 दबाएं।".into(),
        thank_you: "आपके समय के लिए धन्यवाद।".into(),
        goodbye: "अलविदा!".into(),
        invalid_input: "क्षमा करें, यह एक वैध विकल्प नहीं था। कृपया पुनः प्रयास करें।".into(),
        product_info: "हमारा नया उत्पाद आपके दैनिक जीवन को बेहतर बनाने के लिए डिज़ाइन की गई अत्याधुनिक सुविधाएं प्रदान करता है। इसमें उन्नत तकनीक और उपयोगकर्ता के अनुकूल डिज़ाइन शामिल है।".into(),
        offer_details: "विशेष ऑफर! अपनी पहली खरीदारी पर 20 प्रतिशत की छूट पाएं। चेकआउट पर प्रोमो कोड WELCOME20 का उपयोग करें। ऑफर 30 दिनों के लिए वैध है।".into(),
        opt_out_confirm: "आपको हमारी कॉलिंग सूची से सफलतापूर्वक हटा दिया गया है। किसी भी असुविधा के लिए हम क्षमा चाहते हैं।".into(),
        transfer_message: "कृपया प्रतीक्षा करें जब तक हम आपको हमारे ग्राहक सेवा प्रतिनिधि से स्थानांतरित करते हैं।".into(),
    }
}
