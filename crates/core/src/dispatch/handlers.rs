use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Language, NlpResult};
use crate::errors::HandlerError;
use crate::gateway::ApiService;
use crate::knowledge::{Product, TemplateKey};
use crate::nlp::normalize_text;

use super::{HandlerContext, IntentHandler};

pub struct GreetingHandler;

#[async_trait]
impl IntentHandler for GreetingHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        Ok(ctx.knowledge.template(TemplateKey::Greeting, nlp.language))
    }
}

pub struct ProductInfoHandler;

#[async_trait]
impl IntentHandler for ProductInfoHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        // A message naming a catalog product outright is answered from
        // the catalog without touching the backend.
        let normalized_message = normalize_text(&nlp.original_text);
        if let Some(product) = ctx.knowledge.products().iter().find(|product| {
            normalized_message.contains(&normalize_text(&product.name))
        }) {
            return Ok(catalog_product_response(product, nlp.language));
        }

        for mention in &nlp.entities.product_mentions {
            let Some(product) = ctx.knowledge.product_by_keyword(mention) else {
                continue;
            };
            match ctx
                .gateway
                .call(ApiService::Inventory, "get_product", &product.id.0)
                .await
            {
                Ok(record) => return inventory_response(&record, nlp.language),
                // Stock lookup failures degrade to the generic
                // product prompt instead of an apology.
                Err(_) => break,
            }
        }

        Ok(ctx.knowledge.template(TemplateKey::ProductInfo, nlp.language))
    }
}

pub struct PricingHandler;

#[async_trait]
impl IntentHandler for PricingHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        for mention in &nlp.entities.product_mentions {
            if let Some(product) = ctx.knowledge.product_by_keyword(mention) {
                let text = match nlp.language {
                    Language::En => {
                        format!("The price for {} is ${}", product.name, product.price)
                    }
                    Language::Es => {
                        format!("El precio de {} es ${}", product.name, product.price)
                    }
                };
                return Ok(text);
            }
        }

        Ok(ctx.knowledge.template(TemplateKey::Pricing, nlp.language))
    }
}

pub struct ShippingHandler;

#[async_trait]
impl IntentHandler for ShippingHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        if let Some(order_number) = nlp.entities.first_order_number() {
            return match ctx.gateway.call(ApiService::Order, "get_order", order_number).await {
                Ok(record) => shipping_status_response(&record, order_number, nlp.language),
                Err(error) => Ok(match nlp.language {
                    Language::En => format!(
                        "Sorry, I couldn't find information for order {order_number}. Error: {error}"
                    ),
                    Language::Es => format!(
                        "Lo siento, no pude encontrar información para el pedido {order_number}. Error: {error}"
                    ),
                }),
            };
        }

        if let Some(answer) = ctx.knowledge.search_faq("shipping time", nlp.language) {
            return Ok(answer);
        }

        Ok(ctx.knowledge.template(TemplateKey::Shipping, nlp.language))
    }
}

pub struct ReturnsHandler;

#[async_trait]
impl IntentHandler for ReturnsHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        if let Some(answer) = ctx.knowledge.search_faq("return policy", nlp.language) {
            return Ok(answer);
        }

        Ok(ctx.knowledge.template(TemplateKey::Returns, nlp.language))
    }
}

pub struct TechnicalSupportHandler;

#[async_trait]
impl IntentHandler for TechnicalSupportHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        let mut text = ctx.knowledge.template(TemplateKey::TechnicalSupport, nlp.language);
        text.push_str(troubleshooting_steps(nlp.language));
        Ok(text)
    }
}

pub struct OrderStatusHandler;

#[async_trait]
impl IntentHandler for OrderStatusHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        let Some(order_number) = nlp.entities.first_order_number() else {
            return Ok(match nlp.language {
                Language::En => {
                    "To check your order status, please provide your order number.".to_string()
                }
                Language::Es => {
                    "Para verificar el estado de tu pedido, por favor proporciona tu número de pedido."
                        .to_string()
                }
            });
        };

        match ctx.gateway.call(ApiService::Order, "get_order", order_number).await {
            Ok(record) => order_status_response(&record, order_number, nlp.language),
            Err(_) => Ok(match nlp.language {
                Language::En => format!(
                    "Sorry, I couldn't find order {order_number}. Please check the order number."
                ),
                Language::Es => format!(
                    "Lo siento, no pude encontrar el pedido {order_number}. Por favor verifica el número de pedido."
                ),
            }),
        }
    }
}

pub struct AccountHandler;

#[async_trait]
impl IntentHandler for AccountHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        let Some(user_id) = user_id else {
            return Ok(match nlp.language {
                Language::En => {
                    "To access your account information, I need you to log in first.".to_string()
                }
                Language::Es => {
                    "Para acceder a la información de tu cuenta, necesito que inicies sesión primero."
                        .to_string()
                }
            });
        };

        match ctx.gateway.call(ApiService::User, "get_user", user_id).await {
            Ok(record) => account_response(&record, nlp.language),
            Err(error) => Ok(match nlp.language {
                Language::En => format!(
                    "Sorry, I couldn't access your account information. Error: {error}"
                ),
                Language::Es => format!(
                    "Lo siento, no pude acceder a la información de tu cuenta. Error: {error}"
                ),
            }),
        }
    }
}

/// Serves confidently classified messages that still carry no known
/// intent, which only happens when the confidence threshold is zero.
/// Searches the FAQ with the full text first and serves the fallback
/// copy on a miss, the same answer chain the low-confidence route uses.
pub struct UnknownHandler;

#[async_trait]
impl IntentHandler for UnknownHandler {
    async fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        nlp: &NlpResult,
        _user_id: Option<&str>,
    ) -> Result<String, HandlerError> {
        Ok(ctx
            .knowledge
            .search_faq(&nlp.original_text, nlp.language)
            .unwrap_or_else(|| ctx.knowledge.template(TemplateKey::Fallback, nlp.language)))
    }
}

// ------ response composition ------

fn catalog_product_response(product: &Product, language: Language) -> String {
    match language {
        Language::En => {
            format!("{} is available for ${}.", product.name, product.price)
        }
        Language::Es => {
            format!("{} está disponible por ${}.", product.name, product.price)
        }
    }
}

fn inventory_response(record: &Value, language: Language) -> Result<String, HandlerError> {
    let name = required_str(record, ApiService::Inventory, "name")?;
    let quantity = required_u64(record, ApiService::Inventory, "available_quantity")?;
    let last_updated = required_str(record, ApiService::Inventory, "last_updated")?;

    Ok(match language {
        Language::En => format!(
            "Product information for {name}:\nAvailable quantity: {quantity}\nLast updated: {last_updated}"
        ),
        Language::Es => format!(
            "Información del producto {name}:\nCantidad disponible: {quantity}\nÚltima actualización: {last_updated}"
        ),
    })
}

fn shipping_status_response(
    record: &Value,
    order_number: &str,
    language: Language,
) -> Result<String, HandlerError> {
    let status = required_str(record, ApiService::Order, "status")?;
    let estimated_delivery = required_str(record, ApiService::Order, "estimated_delivery")?;
    let tracking_number = record.get("tracking_number").and_then(Value::as_str);

    let mut text = match language {
        Language::En => format!(
            "Order {order_number} status:\nStatus: {status}\nEstimated delivery: {estimated_delivery}"
        ),
        Language::Es => format!(
            "Estado del pedido {order_number}:\nEstado: {status}\nEntrega estimada: {estimated_delivery}"
        ),
    };
    if let Some(tracking_number) = tracking_number {
        match language {
            Language::En => text.push_str(&format!("\nTracking number: {tracking_number}")),
            Language::Es => text.push_str(&format!("\nNúmero de seguimiento: {tracking_number}")),
        }
    }

    Ok(text)
}

fn order_status_response(
    record: &Value,
    order_number: &str,
    language: Language,
) -> Result<String, HandlerError> {
    let status = required_str(record, ApiService::Order, "status")?;
    let total = required_f64(record, ApiService::Order, "total")?;
    let order_date = required_str(record, ApiService::Order, "order_date")?;
    let estimated_delivery = required_str(record, ApiService::Order, "estimated_delivery")?;

    Ok(match language {
        Language::En => format!(
            "Order {order_number} status:\nStatus: {status}\nTotal: ${total}\nOrder date: {order_date}\nEstimated delivery: {estimated_delivery}"
        ),
        Language::Es => format!(
            "Estado del pedido {order_number}:\nEstado: {status}\nTotal: ${total}\nFecha del pedido: {order_date}\nEntrega estimada: {estimated_delivery}"
        ),
    })
}

fn account_response(record: &Value, language: Language) -> Result<String, HandlerError> {
    let name = required_str(record, ApiService::User, "name")?;
    let email = required_str(record, ApiService::User, "email")?;
    let membership_level = required_str(record, ApiService::User, "membership_level")?;
    let account_status = required_str(record, ApiService::User, "account_status")?;

    Ok(match language {
        Language::En => format!(
            "Account information:\nName: {name}\nEmail: {email}\nMembership level: {membership_level}\nAccount status: {account_status}"
        ),
        Language::Es => format!(
            "Información de la cuenta:\nNombre: {name}\nEmail: {email}\nNivel de membresía: {membership_level}\nEstado de la cuenta: {account_status}"
        ),
    })
}

fn troubleshooting_steps(language: Language) -> &'static str {
    match language {
        Language::En => {
            "\n\nBasic troubleshooting steps:\n1. Restart the device\n2. Check all connections\n3. Update software\n4. Contact technical support if the issue persists"
        }
        Language::Es => {
            "\n\nPasos básicos de solución de problemas:\n1. Reinicia el dispositivo\n2. Verifica las conexiones\n3. Actualiza el software\n4. Contacta soporte técnico si el problema persiste"
        }
    }
}

fn required_str<'record>(
    record: &'record Value,
    service: ApiService,
    field: &'static str,
) -> Result<&'record str, HandlerError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or(HandlerError::MalformedRecord { service, field })
}

fn required_u64(record: &Value, service: ApiService, field: &'static str) -> Result<u64, HandlerError> {
    record
        .get(field)
        .and_then(Value::as_u64)
        .ok_or(HandlerError::MalformedRecord { service, field })
}

fn required_f64(record: &Value, service: ApiService, field: &'static str) -> Result<f64, HandlerError> {
    record
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(HandlerError::MalformedRecord { service, field })
}
