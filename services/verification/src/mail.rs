//! Transactional email bodies.

use cheatplace_domain::verification::CodePurpose;

use crate::domain::types::MailContent;

const VERIFICATION_SUBJECT: &str = "Votre code de vérification • CHEATPLACE";

/// Characters of the offer description shown in broadcast mail.
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

pub fn verification_email(code: &str, purpose: CodePurpose) -> MailContent {
    let intro = match purpose {
        CodePurpose::Login => "Voici votre code pour vous connecter :",
        CodePurpose::Signup => "Voici votre code pour finaliser votre inscription :",
    };
    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background: linear-gradient(135deg, #07174a 0%, #0f2b5b 100%); color: #ffffff;">
  <div style="text-align: center; margin-bottom: 20px;">
    <h1 style="color: #7dd3fc; font-size: 28px; margin: 0;">CHEATPLACE-STUDIO</h1>
    <p style="color: #9fb8d9; margin-top: 6px;">Vérification de sécurité</p>
  </div>
  <div style="background: rgba(255,255,255,0.03); border-radius: 12px; padding: 24px; text-align: center;">
    <p style="color: #cfefff; margin-bottom: 18px;">{intro}</p>
    <div style="display: inline-block; background: rgba(0,0,0,0.35); border-radius: 8px; padding: 16px 26px; margin: 18px 0;">
      <span style="font-size: 36px; font-weight: 700; letter-spacing: 6px; color: #7dd3fc;">{code}</span>
    </div>
    <p style="color: #9fb8d9; font-size: 13px; margin-top: 12px;">Ce code expire dans 10 minutes.</p>
  </div>
  <div style="text-align: center; margin-top: 20px; color: #98bcd6; font-size: 12px;">
    <p>Si vous n'avez pas demandé ce code, ignorez cet e-mail.</p>
  </div>
</div>"#,
        code = escape_html(code),
    );
    MailContent {
        subject: VERIFICATION_SUBJECT.to_owned(),
        html,
    }
}

pub fn new_offer_email(title: &str, description: &str) -> MailContent {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0"></head>
<body style="margin: 0; padding: 0; background-color: #0a0a0a; font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif;">
  <table role="presentation" style="max-width: 600px; width: 100%; margin: 0 auto; background-color: #1a1a1a; border-radius: 16px; border: 1px solid #333;">
    <tr><td style="padding: 40px 30px; text-align: center; background: linear-gradient(135deg, #6366f1 0%, #8b5cf6 100%);">
      <h1 style="margin: 0; color: #ffffff; font-size: 28px;">CHEATPLACE-STUDIO</h1>
    </td></tr>
    <tr><td style="padding: 40px 30px;">
      <h2 style="margin: 0 0 20px 0; color: #ffffff; font-size: 24px;">Nouvelle offre disponible !</h2>
      <h3 style="margin: 0 0 15px 0; color: #a78bfa; font-size: 20px;">{title}</h3>
      <p style="margin: 0 0 30px 0; color: #a1a1aa; font-size: 16px; line-height: 1.6;">{description}</p>
      <a href="https://cheatplace.studio" style="display: inline-block; padding: 14px 28px; background: #6366f1; color: #ffffff; text-decoration: none; border-radius: 8px;">Voir l'offre</a>
    </td></tr>
  </table>
</body>
</html>"#,
        title = escape_html(title),
        description = escape_html(&preview(description)),
    );
    MailContent {
        subject: format!("Nouvelle offre disponible : {title}"),
        html,
    }
}

/// First 200 characters, with `...` when something was cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
