//! The single-page form served at `/`.
//!
//! Submits the credential and both PDFs as multipart, then polls the job
//! endpoint once per second to show the latest status line. On completion
//! the report is shown in an iframe and the download link is enabled; on a
//! fatal error the category title and message are shown instead.

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Revisor CGR</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 0; background: #f4f6fa; color: #222; }
        header { background: #003366; color: #fff; padding: 20px 30px; }
        header h1 { margin: 0 0 6px 0; font-size: 1.6em; }
        main { display: flex; gap: 24px; padding: 24px 30px; align-items: flex-start; }
        .config { flex: 1; min-width: 280px; background: #fff; padding: 20px; border-radius: 8px; }
        .report { flex: 3; background: #fff; padding: 20px; border-radius: 8px; }
        label { display: block; font-weight: bold; margin-top: 14px; }
        input[type=password], input[type=file] { width: 100%; margin-top: 6px; }
        small { color: #666; }
        button { margin-top: 18px; width: 100%; padding: 10px; background: #1f5fbf; color: #fff; border: 0; border-radius: 6px; font-size: 1em; cursor: pointer; }
        button:disabled { background: #8aa6d1; cursor: progress; }
        #status { margin-top: 8px; width: 100%; min-height: 2.4em; padding: 6px; box-sizing: border-box; background: #f0f0f0; border-radius: 4px; }
        .error { margin-top: 12px; padding: 10px; background: #fde8e8; border: 1px solid #e0a0a0; border-radius: 6px; display: none; }
        iframe { width: 100%; height: 75vh; border: 1px solid #ddd; border-radius: 6px; }
        #download { display: none; margin-top: 12px; }
    </style>
</head>
<body>
<header>
    <h1>🏛️ Revisor Inteligente de Documentos de Contratación</h1>
    <div><strong>Demo para la Contraloría General de la República de Costa Rica</strong></div>
    <div>Sube ambos archivos PDF, ingresa tu clave de API de Google y la aplicación generará un reporte de verificación.</div>
</header>
<main>
    <section class="config">
        <h3>⚙️ Configuración y Archivos</h3>
        <form id="form">
            <label for="api_key">Google AI API Key</label>
            <input id="api_key" name="api_key" type="password" placeholder="Pega tu clave de API aquí..." autocomplete="off">
            <small>Puedes obtener tu clave en Google AI Studio.</small>
            <label for="file1">1. Resumen del Sistema (SICOP)</label>
            <input id="file1" name="file1" type="file" accept=".pdf">
            <label for="file2">2. Pliego de Condiciones (Cartel)</label>
            <input id="file2" name="file2" type="file" accept=".pdf">
            <button id="submit" type="submit">Analizar Documentos</button>
        </form>
        <label for="status">Estado del Proceso</label>
        <div id="status"></div>
        <div id="error" class="error"><strong id="error-title"></strong><div id="error-message"></div></div>
    </section>
    <section class="report">
        <h3>📋 Reporte Generado</h3>
        <iframe id="preview" title="Vista Previa del Reporte"></iframe>
        <a id="download" href="#" download="reporte_verificacion.html">Descargar Reporte Completo</a>
    </section>
</main>
<script>
const form = document.getElementById('form');
const button = document.getElementById('submit');
const statusBox = document.getElementById('status');
const errorBox = document.getElementById('error');
const preview = document.getElementById('preview');
const download = document.getElementById('download');

function showError(title, message) {
    document.getElementById('error-title').textContent = title;
    document.getElementById('error-message').textContent = message;
    errorBox.style.display = 'block';
}

async function poll(jobId) {
    const res = await fetch('/api/analyses/' + jobId);
    if (!res.ok) {
        showError('Error', 'No se pudo consultar el estado del proceso.');
        button.disabled = false;
        return;
    }
    const job = await res.json();
    statusBox.textContent = job.status;
    if (job.state === 'running') {
        setTimeout(() => poll(jobId), 1000);
        return;
    }
    button.disabled = false;
    if (job.state === 'failed' && job.error) {
        showError(job.error.title, job.error.message);
        return;
    }
    if (job.report_url) {
        preview.src = job.report_url;
    }
    if (job.download_url) {
        download.href = job.download_url;
        download.style.display = 'inline-block';
    }
}

form.addEventListener('submit', async (ev) => {
    ev.preventDefault();
    errorBox.style.display = 'none';
    download.style.display = 'none';
    preview.removeAttribute('src');
    button.disabled = true;
    statusBox.textContent = 'Iniciando proceso...';
    const res = await fetch('/api/analyses', { method: 'POST', body: new FormData(form) });
    if (!res.ok) {
        const body = await res.json().catch(() => ({ error: res.statusText }));
        showError('Error', body.error || res.statusText);
        button.disabled = false;
        return;
    }
    const created = await res.json();
    poll(created.job_id);
});
</script>
</body>
</html>
"##;
