// src/common/numero.rs

//! Normalización del número de cliente, la llave de join de todo el
//! sistema: clientes ↔ avisos ↔ levantamiento zonal.

use serde_json::Value;

/// Normaliza un número de cliente a 12 dígitos con ceros a la izquierda.
///
/// Se descarta todo carácter que no sea dígito. Solo la entrada vacía
/// produce el string vacío, que se trata como "sin llave": esos
/// registros nunca se deduplican entre sí. Una entrada no vacía sin
/// dígitos se rellena igual, quedando en `"000000000000"`. Un número
/// con más de 12 dígitos se conserva tal cual, sin truncar.
pub fn normalizar_numero_cliente(valor: &str) -> String {
    if valor.is_empty() {
        return String::new();
    }
    let digitos: String = valor.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{digitos:0>12}")
}

/// Igual que [`normalizar_numero_cliente`] pero sobre un valor JSON del
/// documento, que puede venir como string o como número.
pub fn normalizar_valor(valor: Option<&Value>) -> String {
    match valor {
        Some(Value::String(s)) => normalizar_numero_cliente(s),
        Some(Value::Number(n)) => normalizar_numero_cliente(&n.to_string()),
        _ => String::new(),
    }
}

/// Llave numérica para la tabla zonal (membresía O(1) por entero).
/// Sin dígitos no hay llave: esos valores no participan de la tabla.
pub fn numero_como_entero(numero: &str) -> Option<u64> {
    if !numero.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    normalizar_numero_cliente(numero).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rellena_con_ceros_a_doce_digitos() {
        assert_eq!(normalizar_numero_cliente("123"), "000000000123");
        assert_eq!(normalizar_numero_cliente("123").len(), 12);
    }

    #[test]
    fn descarta_caracteres_no_numericos() {
        assert_eq!(normalizar_numero_cliente("ab12cd"), "000000000012");
        assert_eq!(normalizar_numero_cliente(" 00-45.6 "), "000000000456");
    }

    #[test]
    fn entrada_vacia_produce_string_vacio() {
        assert_eq!(normalizar_numero_cliente(""), "");
    }

    #[test]
    fn entrada_sin_digitos_rellena_a_puros_ceros() {
        assert_eq!(normalizar_numero_cliente("sin digitos"), "000000000000");
        assert_eq!(normalizar_numero_cliente("abc").len(), 12);
    }

    #[test]
    fn no_trunca_numeros_largos() {
        assert_eq!(normalizar_numero_cliente("1234567890123"), "1234567890123");
    }

    #[test]
    fn acepta_valores_json_string_o_numero() {
        assert_eq!(normalizar_valor(Some(&json!("000123"))), "000000000123");
        assert_eq!(normalizar_valor(Some(&json!(123))), "000000000123");
        assert_eq!(normalizar_valor(Some(&json!(null))), "");
        assert_eq!(normalizar_valor(None), "");
    }

    #[test]
    fn numero_entero_para_tabla_zonal() {
        assert_eq!(numero_como_entero("000100234581"), Some(100234581));
        assert_eq!(numero_como_entero("abc"), None);
    }
}
