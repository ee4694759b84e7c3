//! services/twiml_service.rs
//! Generación de TwiML: qué decir, qué teclas recoger y a dónde ir después.
//!
//! Todas las funciones son puras: dependen sólo del idioma, la campaña,
//! la acción elegida y las teclas marcadas.

use crate::models::campaign_model::{ActionType, Campaign, IvrAction};
use crate::services::language_service::{voice_locale, LanguageCatalog, PromptSet};

pub const VOICE_PATH: &str = "/api/webhook/voice";
pub const GATHER_PATH: &str = "/api/webhook/gather";
pub const OPT_OUT_PATH: &str = "/api/webhook/optout";

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const GATHER_TIMEOUT_SECS: u32 = 5;
const GATHER_NUM_DIGITS: u32 = 1;
const MENU_SUMMARY_WORDS: usize = 5;

const EMPTY_MENU_PROMPT: &str = "Press 0 to hear this message again";
const REPEAT_MENU_PROMPT: &str = "Press 0 to repeat this menu";
const FORWARDING_PROMPT: &str = "Forwarding your call. Please wait.";

/// Tecla reservada para "repetir menú" en el menú dinámico.
pub const REPEAT_DIGIT: &str = "0";

#[derive(Debug, Clone)]
pub struct TwimlGenerator {
    locale: &'static str,
    prompts: PromptSet,
}

impl TwimlGenerator {
    pub fn new(catalog: &LanguageCatalog, language: &str) -> Self {
        TwimlGenerator {
            locale: voice_locale(language),
            prompts: catalog.lookup(language).clone(),
        }
    }

    // ----------------------------------------------------------------
    // Menú dinámico (campañas con intro / acciones)
    // ----------------------------------------------------------------

    pub fn dynamic_welcome(&self, customer_name: &str, campaign: &Campaign) -> String {
        let intro = if campaign.intro_text.trim().is_empty() {
            self.prompts.main_menu.as_str()
        } else {
            campaign.intro_text.as_str()
        };

        render(vec![
            self.say(&self.prompts.greeting(customer_name)),
            self.say(intro),
            self.gather(GATHER_PATH, &build_menu(&campaign.actions)),
            self.say(&self.prompts.invalid_input),
            redirect(VOICE_PATH),
        ])
    }

    pub fn dynamic_response(&self, action: &IvrAction, campaign: &Campaign) -> String {
        match action.action_type {
            ActionType::Forward => self.forward(&action.forward_phone, &action.message),
            ActionType::Information => {
                let message = if action.message.trim().is_empty() {
                    self.prompts.invalid_input.as_str()
                } else {
                    action.message.as_str()
                };

                if is_audio_url(message) {
                    self.play_audio(message, campaign)
                } else {
                    self.speak_then_menu(message, campaign)
                }
            }
        }
    }

    pub fn play_audio(&self, audio_url: &str, campaign: &Campaign) -> String {
        render(vec![
            format!("    <Play>{}</Play>", escape_xml(audio_url.trim())),
            self.gather(GATHER_PATH, &build_menu(&campaign.actions)),
            redirect(VOICE_PATH),
        ])
    }

    pub fn speak_then_menu(&self, message: &str, campaign: &Campaign) -> String {
        render(vec![
            self.say(message),
            self.gather(GATHER_PATH, &build_menu(&campaign.actions)),
            redirect(VOICE_PATH),
        ])
    }

    /// Mensaje previo (o genérico), Dial al número y despedida si el Dial no se completa.
    pub fn forward(&self, phone_number: &str, message: &str) -> String {
        let intro = if message.trim().is_empty() {
            FORWARDING_PROMPT
        } else {
            message.trim()
        };

        render(vec![
            self.say(intro),
            format!("    <Dial>{}</Dial>", escape_xml(phone_number.trim())),
            self.say(&self.prompts.goodbye),
            hangup(),
        ])
    }

    // ----------------------------------------------------------------
    // Menú estático
    // ----------------------------------------------------------------

    pub fn welcome(&self, customer_name: &str) -> String {
        render(vec![
            self.say(&self.prompts.greeting(customer_name)),
            self.say(&self.prompts.main_menu),
            self.gather(GATHER_PATH, &self.prompts.press_to_repeat),
            self.say(&self.prompts.invalid_input),
            redirect(VOICE_PATH),
        ])
    }

    pub fn main_menu(&self) -> String {
        render(vec![
            self.gather(GATHER_PATH, &self.prompts.main_menu),
            self.say(&self.prompts.invalid_input),
            redirect(VOICE_PATH),
        ])
    }

    pub fn product_info(&self) -> String {
        render(vec![
            self.say(&self.prompts.product_info),
            self.gather(GATHER_PATH, &self.prompts.press_for_info),
            redirect(VOICE_PATH),
        ])
    }

    pub fn offer_details(&self) -> String {
        render(vec![
            self.say(&self.prompts.offer_details),
            self.gather(GATHER_PATH, &self.prompts.press_for_info),
            redirect(VOICE_PATH),
        ])
    }

    /// La confirmación ("1") llega al webhook de opt-out.
    pub fn opt_out(&self) -> String {
        render(vec![
            self.gather(OPT_OUT_PATH, &self.prompts.press_to_opt_out),
            redirect(VOICE_PATH),
        ])
    }

    pub fn opt_out_confirm(&self) -> String {
        render(vec![
            self.say(&self.prompts.opt_out_confirm),
            self.say(&self.prompts.goodbye),
            hangup(),
        ])
    }

    /// Cierre cortés sin menú. Ningún flujo de teclas lo usa hoy: el
    /// forward y la baja llevan su propia despedida.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn goodbye(&self) -> String {
        render(vec![
            self.say(&self.prompts.thank_you),
            self.say(&self.prompts.goodbye),
            hangup(),
        ])
    }

    pub fn invalid_input(&self) -> String {
        render(vec![self.say(&self.prompts.invalid_input), redirect(VOICE_PATH)])
    }

    pub fn static_response(&self, option: StaticMenuOption) -> String {
        match option {
            StaticMenuOption::ProductInfo => self.product_info(),
            StaticMenuOption::OfferDetails => self.offer_details(),
            StaticMenuOption::OptOut => self.opt_out(),
            StaticMenuOption::MainMenu => self.main_menu(),
            StaticMenuOption::Invalid => self.invalid_input(),
        }
    }

    // ----------------------------------------------------------------
    // Helpers de marcado
    // ----------------------------------------------------------------

    fn say(&self, text: &str) -> String {
        self.say_indented(text, 4)
    }

    fn say_indented(&self, text: &str, indent: usize) -> String {
        format!(
            r#"{}<Say voice="alice" language="{}">{}</Say>"#,
            " ".repeat(indent),
            self.locale,
            escape_xml(text)
        )
    }

    fn gather(&self, action: &str, prompt: &str) -> String {
        format!(
            "    <Gather action=\"{}\" method=\"POST\" numDigits=\"{}\" timeout=\"{}\">\n{}\n    </Gather>",
            action,
            GATHER_NUM_DIGITS,
            GATHER_TIMEOUT_SECS,
            self.say_indented(prompt, 8)
        )
    }
}

/// Opciones del menú estático (sin campaña o campaña sin contenido).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticMenuOption {
    ProductInfo,
    OfferDetails,
    OptOut,
    MainMenu,
    Invalid,
}

impl StaticMenuOption {
    pub fn from_digits(digits: &str) -> Self {
        match digits.trim() {
            "1" => StaticMenuOption::ProductInfo,
            "2" => StaticMenuOption::OfferDetails,
            "3" => StaticMenuOption::OptOut,
            "0" | "9" => StaticMenuOption::MainMenu,
            _ => StaticMenuOption::Invalid,
        }
    }

    /// Evento de bitácora (evento, detalle) asociado a la opción, si tiene.
    pub fn log_event(&self) -> Option<(&'static str, &'static str)> {
        match self {
            StaticMenuOption::ProductInfo => Some((
                "product_info_requested",
                "User requested product information",
            )),
            StaticMenuOption::OfferDetails => {
                Some(("offer_requested", "User requested offer details"))
            }
            StaticMenuOption::OptOut => Some(("opt_out_requested", "User requested to opt out")),
            StaticMenuOption::MainMenu | StaticMenuOption::Invalid => None,
        }
    }
}

/// Texto del menú a partir de las acciones de la campaña.
pub fn build_menu(actions: &[IvrAction]) -> String {
    if actions.is_empty() {
        return EMPTY_MENU_PROMPT.to_string();
    }

    let mut parts: Vec<String> = actions.iter().map(menu_phrase).collect();
    parts.push(REPEAT_MENU_PROMPT.to_string());
    parts.join(". ")
}

fn menu_phrase(action: &IvrAction) -> String {
    let message = action.message.trim();
    match action.action_type {
        ActionType::Forward if message.is_empty() => {
            format!("Press {} to speak with an agent", action.action_input)
        }
        ActionType::Forward => format!("Press {} to {}", action.action_input, message),
        ActionType::Information => {
            let words: Vec<&str> = message.split_whitespace().collect();
            if words.is_empty() {
                return format!("Press {} for more information", action.action_input);
            }
            let mut summary = words[..words.len().min(MENU_SUMMARY_WORDS)].join(" ");
            if words.len() > MENU_SUMMARY_WORDS {
                summary.push_str("...");
            }
            format!("Press {} for {}", action.action_input, summary)
        }
    }
}

/// Primera acción cuya tecla coincide con `digits`.
/// `None` significa "repetir menú": tecla 0, campaña sin acciones o sin coincidencia.
pub fn select_action<'a>(digits: &str, campaign: &'a Campaign) -> Option<&'a IvrAction> {
    let digits = digits.trim();
    if digits == REPEAT_DIGIT || campaign.actions.is_empty() {
        return None;
    }
    campaign.actions.iter().find(|a| a.action_input == digits)
}

fn is_audio_url(message: &str) -> bool {
    let m = message.trim_start();
    m.starts_with("http://") || m.starts_with("https://")
}

fn redirect(path: &str) -> String {
    format!("    <Redirect>{}</Redirect>", path)
}

fn hangup() -> String {
    "    <Hangup/>".to_string()
}

fn render(lines: Vec<String>) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(XML_HEADER);
    out.push_str("\n<Response>\n");
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("</Response>");
    out
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
