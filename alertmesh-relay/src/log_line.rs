/**
 * FORMAT DES LIGNES DU JOURNAL
 *
 * Chaque message reçu ou envoyé est stocké sous la forme :
 *   Received message at 2025-09-04 12:58:26.580751408 +0530 +0530 from Aaradhya: Hello
 *
 * L'heure suit la représentation texte par défaut d'un noeud : date, heure,
 * nanosecondes sans zéros de fin, offset numérique, puis nom de zone. Le nom
 * de zone n'étant pas connu ici, on répète l'offset (ou "UTC" si nul).
 */

use time::macros::format_description;
use time::OffsetDateTime;

pub fn format_node_time(at: OffsetDateTime) -> String {
    let base = at
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_default();

    let nanos = at.nanosecond();
    let fraction = if nanos == 0 {
        String::new()
    } else {
        let digits = format!("{nanos:09}");
        format!(".{}", digits.trim_end_matches('0'))
    };

    let offset_secs = at.offset().whole_seconds();
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let abs = offset_secs.unsigned_abs();
    let offset = format!("{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60);
    let zone = if offset_secs == 0 { "UTC".to_string() } else { offset.clone() };

    format!("{base}{fraction} {offset} {zone}")
}

pub fn format_log_line(at: OffsetDateTime, sender: &str, text: &str) -> String {
    format!("Received message at {} from {}: {}", format_node_time(at), sender, text)
}
