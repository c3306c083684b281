//! Named HTML entity re-encoding for serialized markup.
//!
//! The HTML5 serializer writes characters such as `®` literally. Downstream messages
//! carry item names exactly as the vendor wrote them, so characters that have a named
//! entity are turned back into `&name;` form.

/// Replaces every character that has a common named entity with that entity.
///
/// Markup characters (`&`, `<`, `>`, `"`) are left alone; the serializer has already
/// escaped them where needed.
pub(crate) fn encode_named_entities(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    for c in html.chars() {
        match named_entity(c) {
            Some(name) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
            None => out.push(c),
        }
    }
    out
}

fn named_entity(c: char) -> Option<&'static str> {
    let name = match c {
        '\u{a0}' => "nbsp",
        '¡' => "iexcl",
        '¢' => "cent",
        '£' => "pound",
        '¤' => "curren",
        '¥' => "yen",
        '¦' => "brvbar",
        '§' => "sect",
        '¨' => "uml",
        '©' => "copy",
        'ª' => "ordf",
        '«' => "laquo",
        '¬' => "not",
        '\u{ad}' => "shy",
        '®' => "reg",
        '¯' => "macr",
        '°' => "deg",
        '±' => "plusmn",
        '²' => "sup2",
        '³' => "sup3",
        '´' => "acute",
        'µ' => "micro",
        '¶' => "para",
        '·' => "middot",
        '¸' => "cedil",
        '¹' => "sup1",
        'º' => "ordm",
        '»' => "raquo",
        '¼' => "frac14",
        '½' => "frac12",
        '¾' => "frac34",
        '¿' => "iquest",
        'À' => "Agrave",
        'Á' => "Aacute",
        'Â' => "Acirc",
        'Ã' => "Atilde",
        'Ä' => "Auml",
        'Å' => "Aring",
        'Æ' => "AElig",
        'Ç' => "Ccedil",
        'È' => "Egrave",
        'É' => "Eacute",
        'Ê' => "Ecirc",
        'Ë' => "Euml",
        'Ì' => "Igrave",
        'Í' => "Iacute",
        'Î' => "Icirc",
        'Ï' => "Iuml",
        'Ð' => "ETH",
        'Ñ' => "Ntilde",
        'Ò' => "Ograve",
        'Ó' => "Oacute",
        'Ô' => "Ocirc",
        'Õ' => "Otilde",
        'Ö' => "Ouml",
        '×' => "times",
        'Ø' => "Oslash",
        'Ù' => "Ugrave",
        'Ú' => "Uacute",
        'Û' => "Ucirc",
        'Ü' => "Uuml",
        'Ý' => "Yacute",
        'Þ' => "THORN",
        'ß' => "szlig",
        'à' => "agrave",
        'á' => "aacute",
        'â' => "acirc",
        'ã' => "atilde",
        'ä' => "auml",
        'å' => "aring",
        'æ' => "aelig",
        'ç' => "ccedil",
        'è' => "egrave",
        'é' => "eacute",
        'ê' => "ecirc",
        'ë' => "euml",
        'ì' => "igrave",
        'í' => "iacute",
        'î' => "icirc",
        'ï' => "iuml",
        'ð' => "eth",
        'ñ' => "ntilde",
        'ò' => "ograve",
        'ó' => "oacute",
        'ô' => "ocirc",
        'õ' => "otilde",
        'ö' => "ouml",
        '÷' => "divide",
        'ø' => "oslash",
        'ù' => "ugrave",
        'ú' => "uacute",
        'û' => "ucirc",
        'ü' => "uuml",
        'ý' => "yacute",
        'þ' => "thorn",
        'ÿ' => "yuml",
        '–' => "ndash",
        '—' => "mdash",
        '‘' => "lsquo",
        '’' => "rsquo",
        '‚' => "sbquo",
        '“' => "ldquo",
        '”' => "rdquo",
        '„' => "bdquo",
        '•' => "bull",
        '…' => "hellip",
        '€' => "euro",
        '™' => "trade",
        _ => return None,
    };
    Some(name)
}
