//! Page module - renders the upload page served at `/`.
//!
//! The page is a single self-contained HTML document. Everything stateful
//! lives in the browser: the unlocked password is held by the script and
//! passed explicitly to each upload, and the upload history is kept in
//! `localStorage` under [`HISTORY_STORAGE_KEY`], newest first, capped at
//! [`HISTORY_LIMIT`] records.

use crate::relay::DEFAULT_MAX_UPLOAD_SIZE;

/// `localStorage` key holding the JSON array of history records.
pub const HISTORY_STORAGE_KEY: &str = "imgbb_relay_history";

/// Maximum number of history records kept in the browser; older ones are dropped.
pub const HISTORY_LIMIT: usize = 500;

/// Render the upload page with the default upload limit.
///
/// Pure: identical input gives byte-identical output. The only branch is
/// whether the password overlay is shown (and the app blurred) on load.
pub fn render_page(requires_password: bool) -> String {
    render_page_with_limit(requires_password, DEFAULT_MAX_UPLOAD_SIZE)
}

/// Render the upload page, pre-filtering files larger than `max_upload_size`
/// in the browser.
pub fn render_page_with_limit(requires_password: bool, max_upload_size: u64) -> String {
    let (overlay_display, app_class) = if requires_password {
        ("flex", "app locked")
    } else {
        ("none", "app")
    };

    PAGE_TEMPLATE
        .replace("__OVERLAY_DISPLAY__", overlay_display)
        .replace("__APP_CLASS__", app_class)
        .replace(
            "__REQUIRES_PASSWORD__",
            if requires_password { "true" } else { "false" },
        )
        .replace("__MAX_UPLOAD_BYTES__", &max_upload_size.to_string())
        .replace("__MAX_UPLOAD_LABEL__", &size_label(max_upload_size))
        .replace("__HISTORY_KEY__", HISTORY_STORAGE_KEY)
        .replace("__HISTORY_LIMIT__", &HISTORY_LIMIT.to_string())
}

fn size_label(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes)
    }
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Image Relay</title>
    <style>
        :root {
            --primary: #6366f1;
            --primary-hover: #4f46e5;
            --bg: #f8fafc;
            --card-bg: rgba(255, 255, 255, 0.78);
            --text: #1e293b;
            --text-light: #64748b;
            --border: #e2e8f0;
            --danger: #ef4444;
        }
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }
        body {
            background: var(--bg);
            background-image: radial-gradient(circle at 20% 20%, rgba(99, 102, 241, 0.12), transparent 40%),
                              radial-gradient(circle at 80% 60%, rgba(16, 185, 129, 0.10), transparent 40%);
            color: var(--text);
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            min-height: 100vh;
        }
        .overlay {
            position: fixed;
            inset: 0;
            z-index: 1000;
            align-items: center;
            justify-content: center;
            background: rgba(15, 23, 42, 0.35);
            backdrop-filter: blur(18px);
            transition: opacity 0.4s ease;
        }
        .overlay.hidden {
            opacity: 0;
            pointer-events: none;
        }
        .login-card {
            background: var(--card-bg);
            border: 1px solid rgba(255, 255, 255, 0.6);
            border-radius: 16px;
            padding: 32px;
            width: min(360px, 90vw);
            box-shadow: 0 20px 50px rgba(15, 23, 42, 0.25);
            text-align: center;
        }
        .login-card h2 {
            font-size: 18px;
            margin-bottom: 16px;
        }
        .login-card input {
            width: 100%;
            padding: 12px 14px;
            border: 1px solid var(--border);
            border-radius: 10px;
            font-size: 14px;
            margin-bottom: 12px;
            outline: none;
        }
        .login-card input:focus {
            border-color: var(--primary);
        }
        .login-card.error input {
            border-color: var(--danger);
        }
        .login-card.shake {
            animation: shake 0.35s;
        }
        @keyframes shake {
            25% { transform: translateX(-8px); }
            50% { transform: translateX(8px); }
            75% { transform: translateX(-4px); }
        }
        .login-error {
            color: var(--danger);
            font-size: 13px;
            min-height: 18px;
            margin-bottom: 8px;
        }
        .btn {
            background: var(--primary);
            color: #fff;
            border: none;
            border-radius: 10px;
            padding: 12px 24px;
            font-size: 14px;
            font-weight: 600;
            cursor: pointer;
        }
        .btn:hover {
            background: var(--primary-hover);
        }
        .btn.full {
            width: 100%;
        }
        .btn.ghost {
            background: transparent;
            color: var(--text-light);
            border: 1px solid var(--border);
        }
        .btn.danger {
            background: var(--danger);
        }
        .app {
            max-width: 960px;
            margin: 0 auto;
            padding: 40px 20px;
            transition: filter 0.4s ease, opacity 0.4s ease;
        }
        .app.locked {
            filter: blur(10px);
            opacity: 0;
            pointer-events: none;
        }
        header {
            text-align: center;
            margin-bottom: 24px;
        }
        header h1 {
            font-size: 26px;
        }
        header p {
            color: var(--text-light);
            font-size: 13px;
            margin-top: 6px;
        }
        .card {
            background: var(--card-bg);
            border: 1px solid var(--border);
            border-radius: 16px;
            padding: 24px;
            margin-bottom: 24px;
        }
        .upload-area {
            border: 2px dashed var(--border);
            border-radius: 12px;
            padding: 48px 20px;
            text-align: center;
            cursor: pointer;
            position: relative;
            transition: border-color 0.2s, background 0.2s;
        }
        .upload-area:hover, .upload-area.dragover {
            border-color: var(--primary);
            background: rgba(99, 102, 241, 0.06);
        }
        .upload-area input[type=file] {
            position: absolute;
            width: 1px;
            height: 1px;
            opacity: 0;
        }
        .upload-text {
            font-weight: 600;
            margin-bottom: 6px;
        }
        .upload-hint {
            color: var(--text-light);
            font-size: 12px;
        }
        .progress {
            display: none;
            text-align: center;
            padding: 24px;
            color: var(--text-light);
        }
        .result {
            display: none;
        }
        .result img {
            max-width: 100%;
            max-height: 320px;
            display: block;
            margin: 0 auto 16px;
            border-radius: 8px;
        }
        .code-row {
            display: flex;
            gap: 8px;
            margin-bottom: 10px;
            align-items: center;
        }
        .code-row label {
            width: 90px;
            font-size: 12px;
            color: var(--text-light);
        }
        .code-row input {
            flex: 1;
            padding: 8px 10px;
            border: 1px solid var(--border);
            border-radius: 8px;
            font-family: ui-monospace, SFMono-Regular, Menlo, monospace;
            font-size: 12px;
        }
        .code-row .btn {
            padding: 8px 14px;
            font-size: 12px;
        }
        .result-actions {
            text-align: center;
            margin-top: 16px;
        }
        .gallery-header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 16px;
        }
        .gallery-header h3 {
            font-size: 16px;
        }
        .grid {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(140px, 1fr));
            gap: 12px;
        }
        .grid-item {
            position: relative;
            border-radius: 10px;
            overflow: hidden;
            border: 1px solid var(--border);
            background: #fff;
        }
        .grid-item img {
            width: 100%;
            height: 120px;
            object-fit: cover;
            display: block;
            cursor: pointer;
        }
        .grid-item .meta {
            font-size: 11px;
            color: var(--text-light);
            padding: 6px 8px;
            white-space: nowrap;
            overflow: hidden;
            text-overflow: ellipsis;
        }
        .grid-item .delete {
            position: absolute;
            top: 6px;
            right: 6px;
            background: rgba(239, 68, 68, 0.9);
            color: #fff;
            border: none;
            border-radius: 6px;
            font-size: 11px;
            padding: 3px 7px;
            cursor: pointer;
        }
        .empty {
            color: var(--text-light);
            font-size: 13px;
            text-align: center;
            padding: 24px;
        }
    </style>
</head>
<body>
    <div class="overlay" id="overlay" style="display: __OVERLAY_DISPLAY__">
        <div class="login-card" id="loginCard">
            <h2>Private image relay</h2>
            <input type="password" id="passwordInput" placeholder="Password" autocomplete="current-password">
            <div class="login-error" id="loginError"></div>
            <button class="btn full" id="unlockButton">Unlock</button>
        </div>
    </div>

    <div class="__APP_CLASS__" id="app">
        <header>
            <h1>Image Relay</h1>
            <p>Batch uploads &middot; up to __MAX_UPLOAD_LABEL__ per file &middot; history stays in this browser</p>
        </header>

        <div class="card">
            <div class="upload-area" id="uploadArea">
                <input type="file" id="fileInput" accept="image/*" multiple>
                <div class="upload-text">Click, drop images here, or paste with Ctrl+V</div>
                <div class="upload-hint">Files are forwarded to the image host one at a time</div>
            </div>
            <div class="progress" id="progress"></div>
            <div class="result" id="result">
                <img id="resultImage" alt="">
                <div class="code-row"><label>URL</label><input readonly id="codeUrl"><button class="btn" data-copy="codeUrl">Copy</button></div>
                <div class="code-row"><label>HTML</label><input readonly id="codeHtml"><button class="btn" data-copy="codeHtml">Copy</button></div>
                <div class="code-row"><label>Markdown</label><input readonly id="codeMarkdown"><button class="btn" data-copy="codeMarkdown">Copy</button></div>
                <div class="code-row"><label>BBCode</label><input readonly id="codeBbcode"><button class="btn" data-copy="codeBbcode">Copy</button></div>
                <div class="result-actions"><button class="btn ghost" id="backButton">Upload more</button></div>
            </div>
        </div>

        <div class="card">
            <div class="gallery-header">
                <h3>History</h3>
                <button class="btn danger" id="clearButton">Clear all</button>
            </div>
            <div class="grid" id="gallery"></div>
        </div>
    </div>

    <script>
    (function () {
        'use strict';

        const REQUIRES_PASSWORD = __REQUIRES_PASSWORD__;
        const MAX_UPLOAD_BYTES = __MAX_UPLOAD_BYTES__;
        const HISTORY_KEY = '__HISTORY_KEY__';
        const HISTORY_LIMIT = __HISTORY_LIMIT__;

        // Password accepted by /auth; passed explicitly to every upload call.
        let unlockedSecret = null;

        // ---------------------------------------------------------------
        // History store (localStorage, newest first)
        // ---------------------------------------------------------------

        const history = {
            list() {
                try {
                    const parsed = JSON.parse(localStorage.getItem(HISTORY_KEY) || '[]');
                    return Array.isArray(parsed) ? parsed : [];
                } catch (_) {
                    return [];
                }
            },
            save(list) {
                localStorage.setItem(HISTORY_KEY, JSON.stringify(list.slice(0, HISTORY_LIMIT)));
            },
            append(record) {
                const list = this.list();
                list.unshift(record);
                this.save(list);
            },
            remove(index) {
                const list = this.list();
                list.splice(index, 1);
                this.save(list);
            },
            clear() {
                localStorage.removeItem(HISTORY_KEY);
            }
        };

        // ---------------------------------------------------------------
        // Password gate
        // ---------------------------------------------------------------

        const overlay = document.getElementById('overlay');
        const loginCard = document.getElementById('loginCard');
        const loginError = document.getElementById('loginError');
        const passwordInput = document.getElementById('passwordInput');
        const app = document.getElementById('app');

        function unlock() {
            overlay.classList.add('hidden');
            app.classList.remove('locked');
            setTimeout(function () { overlay.style.display = 'none'; }, 400);
        }

        function flashError(message) {
            loginError.textContent = message;
            loginCard.classList.add('error', 'shake');
            setTimeout(function () { loginCard.classList.remove('shake'); }, 400);
            passwordInput.select();
        }

        async function verifyAndUnlock() {
            const candidate = passwordInput.value;
            if (!candidate) {
                flashError('Enter the password');
                return;
            }
            const form = new FormData();
            form.append('password', candidate);
            let response;
            try {
                response = await fetch('/auth', { method: 'POST', body: form });
            } catch (e) {
                alert('Could not reach the server. Check your connection.');
                return;
            }
            if (response.ok) {
                unlockedSecret = candidate;
                loginError.textContent = '';
                loginCard.classList.remove('error');
                unlock();
            } else {
                flashError('Wrong password');
            }
        }

        document.getElementById('unlockButton').addEventListener('click', verifyAndUnlock);
        passwordInput.addEventListener('keydown', function (e) {
            if (e.key === 'Enter') verifyAndUnlock();
        });
        if (REQUIRES_PASSWORD) passwordInput.focus();

        // ---------------------------------------------------------------
        // Uploads
        // ---------------------------------------------------------------

        const uploadArea = document.getElementById('uploadArea');
        const fileInput = document.getElementById('fileInput');
        const progress = document.getElementById('progress');
        const result = document.getElementById('result');

        async function uploadOne(file, secret) {
            const form = new FormData();
            form.append('file', file);
            if (secret !== null) form.append('password', secret);

            let response;
            try {
                response = await fetch('/upload', { method: 'POST', body: form });
            } catch (e) {
                throw new Error('connection lost: ' + e.message);
            }

            let body = {};
            try {
                body = await response.json();
            } catch (_) {
                // non-JSON error bodies fall through to the status check
            }
            if (!response.ok || !body.success) {
                let message = body.error || ('HTTP ' + response.status);
                if (body.detail) message += ' (' + body.detail + ')';
                throw new Error(message);
            }
            return body;
        }

        // Files go up strictly one at a time; a failure is reported for that
        // file alone and the queue carries on.
        async function uploadQueue(files) {
            if (REQUIRES_PASSWORD && unlockedSecret === null) {
                overlay.style.display = 'flex';
                overlay.classList.remove('hidden');
                return;
            }

            uploadArea.style.display = 'none';
            result.style.display = 'none';
            progress.style.display = 'block';

            let last = null;
            for (let i = 0; i < files.length; i++) {
                const file = files[i];
                progress.textContent = 'Uploading ' + (i + 1) + ' of ' + files.length + ': ' + file.name;

                if (!file.type.startsWith('image/')) {
                    alert(file.name + ' is not an image, skipped.');
                    continue;
                }
                if (file.size > MAX_UPLOAD_BYTES) {
                    alert(file.name + ' is larger than __MAX_UPLOAD_LABEL__, skipped.');
                    continue;
                }

                try {
                    const uploaded = await uploadOne(file, REQUIRES_PASSWORD ? unlockedSecret : null);
                    const record = {
                        url: uploaded.url,
                        thumb_url: uploaded.thumb_url,
                        delete_url: uploaded.delete_url,
                        filename: uploaded.filename,
                        timestamp: Date.now()
                    };
                    history.append(record);
                    last = record;
                } catch (e) {
                    alert(file.name + ' failed: ' + e.message);
                }
            }

            progress.style.display = 'none';
            fileInput.value = '';
            renderGallery();
            if (last) {
                showResult(last);
            } else {
                uploadArea.style.display = 'block';
            }
        }

        function showResult(record) {
            const alt = record.filename || 'image';
            document.getElementById('resultImage').src = record.url;
            document.getElementById('codeUrl').value = record.url;
            document.getElementById('codeHtml').value = '<img src="' + record.url + '" alt="' + alt.replace(/"/g, '&quot;') + '">';
            document.getElementById('codeMarkdown').value = '![' + alt.replace(/[\[\]]/g, '') + '](' + record.url + ')';
            document.getElementById('codeBbcode').value = '[img]' + record.url + '[/img]';
            uploadArea.style.display = 'none';
            result.style.display = 'block';
        }

        function resetToUpload() {
            result.style.display = 'none';
            uploadArea.style.display = 'block';
        }

        async function copyText(text) {
            try {
                await navigator.clipboard.writeText(text);
            } catch (_) {
                const scratch = document.createElement('textarea');
                scratch.value = text;
                document.body.appendChild(scratch);
                scratch.select();
                document.execCommand('copy');
                scratch.remove();
            }
        }

        result.addEventListener('click', function (e) {
            const target = e.target.getAttribute('data-copy');
            if (target) copyText(document.getElementById(target).value);
        });
        document.getElementById('backButton').addEventListener('click', resetToUpload);

        uploadArea.addEventListener('click', function (e) {
            if (e.target !== fileInput) fileInput.click();
        });
        uploadArea.addEventListener('dragover', function (e) {
            e.preventDefault();
            uploadArea.classList.add('dragover');
        });
        uploadArea.addEventListener('dragleave', function () {
            uploadArea.classList.remove('dragover');
        });
        uploadArea.addEventListener('drop', function (e) {
            e.preventDefault();
            uploadArea.classList.remove('dragover');
            if (e.dataTransfer.files.length) uploadQueue(Array.from(e.dataTransfer.files));
        });
        fileInput.addEventListener('change', function (e) {
            if (e.target.files.length) uploadQueue(Array.from(e.target.files));
        });
        document.addEventListener('paste', function (e) {
            const items = (e.clipboardData && e.clipboardData.items) || [];
            const files = [];
            for (const item of items) {
                if (item.kind === 'file') {
                    const file = item.getAsFile();
                    if (file) files.push(file);
                }
            }
            if (files.length) uploadQueue(files);
        });

        // ---------------------------------------------------------------
        // Gallery
        // ---------------------------------------------------------------

        const gallery = document.getElementById('gallery');

        function renderGallery() {
            const list = history.list();
            gallery.replaceChildren();

            if (!list.length) {
                const empty = document.createElement('div');
                empty.className = 'empty';
                empty.textContent = 'No uploads yet';
                gallery.appendChild(empty);
                return;
            }

            list.forEach(function (record, index) {
                const item = document.createElement('div');
                item.className = 'grid-item';

                const img = document.createElement('img');
                img.src = record.thumb_url || record.url;
                img.alt = record.filename || '';
                img.title = record.filename || '';
                img.loading = 'lazy';
                img.addEventListener('click', function () { showResult(record); });

                const meta = document.createElement('div');
                meta.className = 'meta';
                meta.textContent = new Date(record.timestamp).toLocaleString() + ' · ' + (record.filename || '');

                const remove = document.createElement('button');
                remove.className = 'delete';
                remove.textContent = 'Delete';
                remove.addEventListener('click', function () { deleteRecord(index, record.delete_url); });

                item.append(img, meta, remove);
                gallery.appendChild(item);
            });
        }

        // The host's deletion page opens in a new tab; whether it succeeds is
        // between the user and the host.
        function deleteRecord(index, deleteUrl) {
            if (!confirm('Remove this record and open the host deletion page?')) return;
            if (deleteUrl) window.open(deleteUrl, '_blank', 'noopener');
            history.remove(index);
            renderGallery();
        }

        document.getElementById('clearButton').addEventListener('click', function () {
            if (!confirm('Clear the whole local history? Hosted images are not deleted.')) return;
            history.clear();
            renderGallery();
        });

        renderGallery();
    })();
    </script>
</body>
</html>
"##;
