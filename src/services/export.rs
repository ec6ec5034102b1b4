// src/services/export.rs

//! Exportación de la lista de clientes a un libro Excel. El orden de
//! columnas es fijo y coincide con lo que esperan las planillas del
//! área operativa, no con el orden interno de los campos.

use chrono::Utc;
use rust_xlsxwriter::Workbook;

use crate::{
    common::{error::AppError, fechas},
    models::cliente::Cliente,
};

const ENCABEZADOS: [&str; 20] = [
    "N° Cliente",
    "Nombre",
    "RUT",
    "Dirección",
    "Correo",
    "Teléfono",
    "Teléfono 2",
    "Marca",
    "Modelo",
    "Medidor Instalado",
    "Medidor Retirado",
    "Poste",
    "Aviso",
    "Comentarios",
    "Latitud",
    "Longitud",
    "Fecha Registro",
    "Solicitante",
    "Origen Datos",
    "Relación",
];

/// Nombre sugerido para la descarga: `catastro_YYYYMMDD.xlsx`.
pub fn nombre_archivo() -> String {
    format!("catastro_{}.xlsx", fechas::sufijo_fecha(&Utc::now()))
}

/// Genera el libro en memoria; una hoja "Clientes", una fila por
/// registro en el orden recibido.
pub fn exportar_clientes_xlsx(clientes: &[Cliente]) -> Result<Vec<u8>, AppError> {
    let xlsx = |e: rust_xlsxwriter::XlsxError| AppError::XlsxError(e.to_string());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Clientes").map_err(xlsx)?;

    for (col, encabezado) in ENCABEZADOS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string(0, col, *encabezado).map_err(xlsx)?;
        // columnas al menos tan anchas como su etiqueta
        worksheet
            .set_column_width(col, (encabezado.chars().count() as f64 + 4.0).max(12.0))
            .map_err(xlsx)?;
    }

    for (i, cliente) in clientes.iter().enumerate() {
        let fila = (i + 1) as u32;

        let textos = [
            &cliente.numero_cliente,
            &cliente.nombre,
            &cliente.rut,
            &cliente.direccion,
            &cliente.correo,
            &cliente.telefono,
            &cliente.telefono2,
            &cliente.marca,
            &cliente.modelo,
            &cliente.medidor_instalado,
            &cliente.medidor_retirado,
            &cliente.poste,
        ];
        for (col, texto) in textos.iter().enumerate() {
            worksheet.write_string(fila, col as u16, texto.as_str()).map_err(xlsx)?;
        }

        worksheet.write_string(fila, 12, &cliente.aviso).map_err(xlsx)?;
        worksheet.write_string(fila, 13, &cliente.comentarios).map_err(xlsx)?;

        if let Some(latitud) = cliente.latitud {
            worksheet.write_number(fila, 14, latitud).map_err(xlsx)?;
        }
        if let Some(longitud) = cliente.longitud {
            worksheet.write_number(fila, 15, longitud).map_err(xlsx)?;
        }

        let fecha = cliente
            .fecha_registro
            .as_ref()
            .map(fechas::formatear_fecha)
            .unwrap_or_default();
        worksheet.write_string(fila, 16, &fecha).map_err(xlsx)?;
        worksheet.write_string(fila, 17, &cliente.solicitante).map_err(xlsx)?;
        worksheet.write_string(fila, 18, &cliente.origen_datos).map_err(xlsx)?;
        worksheet.write_string(fila, 19, &cliente.relacion).map_err(xlsx)?;
    }

    workbook.save_to_buffer().map_err(xlsx)
}
