//! Error, status and card-name catalogs
//!
//! Maps the one-byte codes carried in Abort, StatusInformation and
//! IntermediateStatus packages onto display text. Error text is
//! English-only; the intermediate status catalog is localized.

use zvtlink_types::Language;

/// Resolve an abort / result error code to its English text
pub fn error_text(code: u8) -> Option<&'static str> {
    let text = match code {
        0x62 => "Memory full",
        0x64 => "Card not present",
        0x65 => "Card data not present",
        0x66 => "Processing error",
        0x67 => "Function not permitted for ec and Maestro cards",
        0x68 => "Function not permitted for credit and tank cards",
        0x6A => "Turnover file full",
        0x6B => "Function deactivated",
        0x6C => "Card not readable",
        0x6E => "Card in blocked list",
        0x6F => "Wrong currency",
        0x71 => "Credit not sufficient",
        0x72 => "Chip error",
        0x73 => "Card data incorrect",
        0x77 => "End-of-day batch not possible",
        0x78 => "Card expired",
        0x79 => "Card not yet valid",
        0x7A => "Card unknown",
        0x7C => "Fallback to magnetic stripe not possible",
        0x7E => "System malfunction",
        0x83 => "Function not possible",
        0x85 => "Payment not possible",
        0x89 => "Incorrect PIN",
        0x8A => "PIN try limit exceeded",
        0x9A => "Protocol error",
        0x9B => "Abort via timeout or abort key",
        0x9C => "Terminal busy",
        0xA0 => "Receiver not ready",
        0xA1 => "Remote station does not respond",
        0xA3 => "No connection",
        0xB1 => "Print buffer full",
        0xC2 => "Illegal sequence",
        0xC3 => "Illegal command",
        0xC8 => "Diagnosis required",
        0xD2 => "Date or time incorrect",
        0xFF => "System error",
        _ => return None,
    };
    Some(text)
}

/// Resolve an intermediate status code in the requested language
pub fn intermediate_status_text(code: u8, language: Language) -> Option<&'static str> {
    match language {
        Language::English => intermediate_status_en(code),
        Language::German => intermediate_status_de(code),
    }
}

fn intermediate_status_en(code: u8) -> Option<&'static str> {
    let text = match code {
        0x00 => "PT is waiting for amount confirmation",
        0x01 => "Please watch PIN pad",
        0x02 => "Please watch PIN pad",
        0x03 => "Not accepted",
        0x04 => "PT is waiting for response from FEP",
        0x05 => "PT is sending auto reversal",
        0x06 => "PT is sending post bookings",
        0x07 => "Card not admitted",
        0x08 => "Card unknown",
        0x09 => "Expired card",
        0x0A => "Insert card",
        0x0B => "Please remove card",
        0x0C => "Card not readable",
        0x0D => "Processing error",
        0x0E => "Please wait",
        0x0F => "PT is commencing an automatic end-of-day batch",
        0x10 => "Invalid card",
        0x11 => "Balance display",
        0x12 => "System malfunction",
        0x13 => "Payment not possible",
        0x14 => "Credit not sufficient",
        0x15 => "Incorrect PIN",
        0x16 => "Limit not sufficient",
        0x17 => "Please wait",
        0x18 => "PIN try limit exceeded",
        0x19 => "Card data incorrect",
        0x1A => "Service mode",
        0x1B => "Approved, please take goods",
        _ => return None,
    };
    Some(text)
}

fn intermediate_status_de(code: u8) -> Option<&'static str> {
    let text = match code {
        0x00 => "Terminal wartet auf Betragsbestätigung",
        0x01 => "Bitte Anzeige auf dem PIN-Pad beachten",
        0x02 => "Bitte Anzeige auf dem PIN-Pad beachten",
        0x03 => "Vorgang nicht möglich",
        0x04 => "Terminal wartet auf Antwort vom FEP",
        0x05 => "Terminal sendet Auto-Storno",
        0x06 => "Terminal sendet Nachbuchungen",
        0x07 => "Karte nicht zugelassen",
        0x08 => "Karte unbekannt",
        0x09 => "Karte abgelaufen",
        0x0A => "Karte einstecken",
        0x0B => "Bitte Karte entnehmen",
        0x0C => "Karte nicht lesbar",
        0x0D => "Verarbeitungsfehler",
        0x0E => "Bitte warten",
        0x0F => "Terminal startet automatischen Kassenschnitt",
        0x10 => "Karte ungültig",
        0x11 => "Saldenanzeige",
        0x12 => "Systemfehler",
        0x13 => "Zahlung nicht möglich",
        0x14 => "Guthaben nicht ausreichend",
        0x15 => "PIN falsch",
        0x16 => "Limit nicht ausreichend",
        0x17 => "Bitte warten",
        0x18 => "PIN-Fehlversuche überschritten",
        0x19 => "Kartendaten fehlerhaft",
        0x1A => "Servicemodus",
        0x1B => "Genehmigt, bitte Ware entnehmen",
        _ => return None,
    };
    Some(text)
}

/// Resolve a card type code to the scheme name
pub fn card_name(code: u8) -> Option<&'static str> {
    let name = match code {
        0x05 => "girocard",
        0x06 => "Mastercard",
        0x08 => "American Express",
        0x0A => "Visa",
        0x0C => "Diners Club",
        0x0D => "V PAY",
        0x0E => "JCB",
        0x2E => "Maestro",
        _ => return None,
    };
    Some(name)
}
