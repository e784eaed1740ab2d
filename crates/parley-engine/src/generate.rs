//! Reply generation as a strictly ordered fallback chain.
//!
//! Stage 1 asks the LLM provider (when configured), stage 2 templates the top
//! retrieved entry or falls back to a canned intent reply, stage 3 is a static
//! emergency paragraph. Each stage only runs when every stage above it
//! declined or failed, so the chain always produces a reply and never returns
//! an error. No stage has side effects.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use parley_core::types::{Intent, Language, Sender};
use parley_knowledge::RetrievalResult;

use crate::provider::LlmProvider;
use crate::types::{GeneratedReply, Message, ResponseSource};

/// Builds replies from retrieved knowledge, conversation history, and an
/// optional LLM provider.
pub struct ResponseGenerator {
    provider: Option<Arc<dyn LlmProvider>>,
    llm_timeout: Duration,
    max_tokens: u32,
    temperature: f32,
    /// How many recent turns the prompt carries.
    context_turns: usize,
}

impl ResponseGenerator {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        llm_timeout: Duration,
        max_tokens: u32,
        temperature: f32,
        context_turns: usize,
    ) -> Self {
        Self {
            provider,
            llm_timeout,
            max_tokens,
            temperature,
            context_turns,
        }
    }

    /// Run the chain. Always succeeds.
    pub async fn generate(
        &self,
        query: &str,
        language: Language,
        intent: Intent,
        context: &[RetrievalResult],
        history: &[Message],
    ) -> GeneratedReply {
        let had_context = !context.is_empty();

        // Stage 1: LLM.
        if let Some(provider) = &self.provider {
            let prompt = self.build_prompt(query, language, context, history);
            let call = provider.complete(&prompt, self.max_tokens, self.temperature);
            match tokio::time::timeout(self.llm_timeout, call).await {
                Ok(Ok(text)) => {
                    let source = ResponseSource::Llm;
                    return GeneratedReply {
                        text,
                        source,
                        confidence: source.confidence(had_context),
                    };
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "LLM stage failed, falling back");
                }
                Err(_) => {
                    warn!(timeout = ?self.llm_timeout, "LLM stage timed out, falling back");
                }
            }
        } else {
            debug!("no LLM provider configured, skipping LLM stage");
        }

        // Stage 2: knowledge template, or a canned reply for a recognized
        // intent when retrieval came back empty.
        if let Some(top) = context.first() {
            let source = ResponseSource::KnowledgeBase;
            return GeneratedReply {
                text: format!("{}\n\n{}", top.entry.content, call_to_action(intent, language)),
                source,
                confidence: source.confidence(had_context),
            };
        }
        if intent != Intent::General {
            let source = ResponseSource::Fallback;
            return GeneratedReply {
                text: canned_reply(intent, language).to_string(),
                source,
                confidence: source.confidence(had_context),
            };
        }

        // Stage 3: emergency.
        let source = ResponseSource::EmergencyFallback;
        GeneratedReply {
            text: emergency_reply(language).to_string(),
            source,
            confidence: source.confidence(had_context),
        }
    }

    /// Assemble the LLM prompt: language-locked instructions, retrieved
    /// entries, the tail of the conversation, then the current question.
    fn build_prompt(
        &self,
        query: &str,
        language: Language,
        context: &[RetrievalResult],
        history: &[Message],
    ) -> String {
        let mut prompt = String::new();
        prompt.push_str(system_instructions(language));
        prompt.push_str("\n\n");

        if !context.is_empty() {
            prompt.push_str(match language {
                Language::Fr => "Informations pertinentes :\n",
                Language::En => "Relevant information:\n",
            });
            for result in context {
                prompt.push_str(&format!(
                    "- {}: {}\n",
                    result.entry.title, result.entry.content
                ));
            }
            prompt.push('\n');
        }

        // One turn is a user/bot message pair.
        let tail = self.context_turns * 2;
        let recent = if history.len() > tail {
            &history[history.len() - tail..]
        } else {
            history
        };
        if !recent.is_empty() {
            prompt.push_str(match language {
                Language::Fr => "Conversation récente :\n",
                Language::En => "Recent conversation:\n",
            });
            for msg in recent {
                let who = match msg.sender {
                    Sender::User => "User",
                    Sender::Bot => "Assistant",
                };
                prompt.push_str(&format!("{}: {}\n", who, msg.content));
            }
            prompt.push('\n');
        }

        prompt.push_str(match language {
            Language::Fr => "Question : ",
            Language::En => "Question: ",
        });
        prompt.push_str(query);
        prompt
    }
}

fn system_instructions(language: Language) -> &'static str {
    match language {
        Language::Fr => {
            "Tu es l'assistant virtuel d'une agence de services numériques \
             (sites web, applications mobiles, automatisation WhatsApp, \
             marketing digital). Réponds toujours en français, sur un ton \
             professionnel et chaleureux, en 2 à 4 phrases. Appuie-toi sur \
             les informations fournies; si elles ne suffisent pas, invite à \
             contacter l'équipe."
        }
        Language::En => {
            "You are the virtual assistant of a digital services agency \
             (websites, mobile apps, WhatsApp automation, digital \
             marketing). Always answer in English, in a warm professional \
             tone, in 2 to 4 sentences. Ground your answer in the provided \
             information; if it is not enough, invite the user to contact \
             the team."
        }
    }
}

fn call_to_action(intent: Intent, language: Language) -> &'static str {
    match (intent, language) {
        (Intent::Services, Language::Fr) => {
            "Souhaitez-vous en savoir plus sur l'un de ces services ?"
        }
        (Intent::Services, Language::En) => {
            "Would you like to know more about any of these services?"
        }
        (Intent::Pricing, Language::Fr) => {
            "Souhaitez-vous un devis personnalisé pour votre projet ?"
        }
        (Intent::Pricing, Language::En) => {
            "Would you like a personalized quote for your project?"
        }
        (Intent::Contact, Language::Fr) => {
            "N'hésitez pas à nous écrire, nous répondons rapidement."
        }
        (Intent::Contact, Language::En) => {
            "Feel free to write to us, we reply quickly."
        }
        (_, Language::Fr) => "Comment puis-je vous aider davantage ?",
        (_, Language::En) => "How else can I help you?",
    }
}

fn canned_reply(intent: Intent, language: Language) -> &'static str {
    match (intent, language) {
        (Intent::Greeting, Language::Fr) => {
            "Bonjour ! Je suis l'assistant virtuel de l'agence. Je peux vous \
             renseigner sur nos services, nos tarifs ou la prise de contact. \
             Comment puis-je vous aider ?"
        }
        (Intent::Greeting, Language::En) => {
            "Hello! I'm the agency's virtual assistant. I can tell you about \
             our services, our pricing, or how to get in touch. How can I \
             help you?"
        }
        (Intent::Services, Language::Fr) => {
            "Nous créons des sites web, des applications mobiles, des \
             automatisations WhatsApp et des campagnes de marketing digital. \
             Dites-m'en plus sur votre projet et je vous orienterai."
        }
        (Intent::Services, Language::En) => {
            "We build websites, mobile apps, WhatsApp automations, and \
             digital marketing campaigns. Tell me more about your project \
             and I'll point you in the right direction."
        }
        (Intent::Pricing, Language::Fr) => {
            "Nos tarifs dépendent de la taille du projet. Décrivez-moi votre \
             besoin et nous vous préparerons un devis gratuit sous 24 heures."
        }
        (Intent::Pricing, Language::En) => {
            "Our pricing depends on the size of the project. Describe what \
             you need and we'll prepare a free quote within 24 hours."
        }
        (Intent::Contact, Language::Fr) => {
            "Vous pouvez joindre l'équipe par email ou WhatsApp, ou réserver \
             un appel découverte gratuit. Souhaitez-vous que je vous indique \
             les coordonnées ?"
        }
        (Intent::Contact, Language::En) => {
            "You can reach the team by email or WhatsApp, or book a free \
             discovery call. Would you like the contact details?"
        }
        (Intent::General, Language::Fr) | (Intent::General, Language::En) => {
            // Unreachable in the chain; General falls through to emergency.
            ""
        }
    }
}

fn emergency_reply(language: Language) -> &'static str {
    match language {
        Language::Fr => {
            "Merci pour votre message ! Nous accompagnons les entreprises \
             avec des sites web, des applications mobiles, l'automatisation \
             WhatsApp et le marketing digital. Posez-moi une question sur nos \
             services ou nos tarifs, ou contactez directement l'équipe pour \
             discuter de votre projet."
        }
        Language::En => {
            "Thanks for your message! We help businesses with websites, \
             mobile apps, WhatsApp automation, and digital marketing. Ask me \
             about our services or pricing, or contact the team directly to \
             discuss your project."
        }
    }
}
