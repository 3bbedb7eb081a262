use crate::models::{MOOD_LABELS, TRIGGER_CATEGORIES};

pub fn render_index() -> String {
    INDEX_HTML
        .replace("{{TRIGGER_OPTIONS}}", &options(&TRIGGER_CATEGORIES))
        .replace("{{MOOD_OPTIONS}}", &options(&MOOD_LABELS))
}

fn options(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| format!("<option value=\"{value}\">{value}</option>"))
        .collect::<Vec<_>>()
        .join("")
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Recovery Path</title>
  <style>
    :root {
      --bg: #020617;
      --panel: #0f172a;
      --panel-2: #1e293b;
      --line: #334155;
      --ink: #f1f5f9;
      --muted: #94a3b8;
      --red: #f87171;
      --green: #10b981;
      --blue: #3b82f6;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    .view {
      display: none;
      max-width: 1100px;
      margin: 0 auto;
      padding: 24px 16px 64px;
    }

    .view.active {
      display: block;
    }

    .card {
      background: var(--panel);
      border: 1px solid var(--panel-2);
      border-radius: 16px;
      padding: 24px;
    }

    .grid {
      display: grid;
      gap: 20px;
      grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
      margin-bottom: 20px;
    }

    button, select, input, textarea {
      font: inherit;
      color: inherit;
    }

    button {
      background: var(--panel-2);
      border: 1px solid var(--line);
      border-radius: 10px;
      padding: 10px 14px;
      cursor: pointer;
    }

    button.primary {
      background: var(--blue);
      border-color: var(--blue);
    }

    button.danger {
      background: #dc2626;
      border-color: #dc2626;
      font-weight: 700;
    }

    input, select, textarea {
      width: 100%;
      background: var(--bg);
      border: 1px solid var(--line);
      border-radius: 8px;
      padding: 10px;
      margin: 6px 0 14px;
    }

    label {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .muted {
      color: var(--muted);
    }

    .profile-btn {
      display: block;
      width: 100%;
      text-align: left;
      margin-bottom: 10px;
    }

    .timer {
      display: grid;
      grid-template-columns: repeat(4, 1fr);
      text-align: center;
      font-variant-numeric: tabular-nums;
    }

    .timer strong {
      display: block;
      font-size: 2.6rem;
      font-family: monospace;
    }

    .list {
      max-height: 320px;
      overflow-y: auto;
    }

    .entry {
      background: var(--bg);
      border: 1px solid var(--panel-2);
      border-radius: 10px;
      padding: 10px;
      margin-bottom: 8px;
      font-size: 0.9rem;
    }

    .tabs button.on {
      background: var(--line);
    }

    .sos-step {
      opacity: 0.4;
    }

    .sos-step.current {
      opacity: 1;
      border-color: var(--blue);
    }

    .sos-step.done {
      opacity: 0.7;
      border-color: var(--green);
    }

    .empty {
      height: 220px;
      display: grid;
      place-items: center;
      border: 2px dashed var(--line);
      border-radius: 12px;
      color: var(--muted);
    }

    svg text {
      fill: var(--muted);
      font-size: 11px;
    }
  </style>
</head>
<body>
  <section id="view-select" class="view active">
    <div class="card" style="max-width: 460px; margin: 8vh auto 0;">
      <h1>Recovery Path</h1>
      <p class="muted">Select a profile to continue your journey.</p>
      <div id="profiles"></div>
      <input id="new-name" placeholder="New User Name" />
      <button class="primary" id="add-profile">Add profile</button>
      <hr style="border-color: var(--panel-2); margin: 20px 0;" />
      <label>Import JSON <input type="file" id="import-file" accept=".json" /></label>
    </div>
  </section>

  <section id="view-dashboard" class="view">
    <header style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px;">
      <div>
        <h2 style="margin: 0;">Recovery Path</h2>
        <span class="muted">Welcome back, <span id="profile-name"></span></span>
      </div>
      <div>
        <a href="/api/export"><button>Export JSON</button></a>
        <button data-nav="select">Switch user</button>
      </div>
    </header>

    <div class="grid">
      <div class="card">
        <p class="muted">CURRENT CLEAN STREAK</p>
        <div class="timer">
          <div><strong id="t-days">00</strong>Days</div>
          <div><strong id="t-hours">00</strong>Hours</div>
          <div><strong id="t-mins">00</strong>Mins</div>
          <div><strong id="t-secs">00</strong>Secs</div>
        </div>
      </div>
      <div style="display: grid; gap: 10px;">
        <button class="danger" data-nav="sos">I HAVE AN URGE (SOS)</button>
        <button data-nav="daily">Daily check-in</button>
        <button data-nav="weekly">Weekly report</button>
        <button data-nav="relapse">Log relapse</button>
      </div>
    </div>

    <div class="grid">
      <div class="card">
        <div style="display: flex; justify-content: space-between;">
          <h3>Relapse Frequency</h3>
          <div class="tabs">
            <button data-window="week" class="on">week</button>
            <button data-window="month">month</button>
            <button data-window="year">year</button>
          </div>
        </div>
        <div id="relapse-chart"></div>
      </div>
      <div class="card">
        <h3>Urge Intensity</h3>
        <div id="urge-chart"></div>
      </div>
    </div>

    <div class="grid">
      <div class="card"><h3>Daily Logs</h3><div id="daily-list" class="list"></div></div>
      <div class="card"><h3>Relapses</h3><div id="relapse-list" class="list"></div></div>
      <div class="card"><h3>Weekly</h3><div id="weekly-list" class="list"></div></div>
    </div>
  </section>

  <section id="view-sos" class="view">
    <button data-nav="dashboard">Back</button>
    <h2>Emergency Protocol</h2>
    <div id="sos-steps"></div>
    <div id="sos-finished" style="display: none;" class="card">
      <p>You made it through. Well done.</p>
      <button class="primary" data-nav="dashboard">Return to Dashboard</button>
    </div>
    <p><button data-nav="relapse">I Relapsed (Open Report)</button></p>
  </section>

  <section id="view-relapse" class="view">
    <form id="relapse-form" class="card" style="max-width: 640px; margin: 0 auto;">
      <h2>Relapse Report</h2>
      <p class="muted">Reflection to understand patterns, not to feel guilt.</p>
      <label>1. What was the main trigger?
        <select name="trigger" required><option value="">Select a trigger...</option>{{TRIGGER_OPTIONS}}</select>
      </label>
      <label>2. Describe the situation<textarea name="situation"></textarea></label>
      <label>3. Which part of the plan was missed?<textarea name="missedPlan"></textarea></label>
      <label>4. What were you feeling?<input name="emotion" /></label>
      <label>5. What will you do differently?<textarea name="improvementPlan"></textarea></label>
      <button class="primary" type="submit">Save report</button>
      <button type="button" data-nav="dashboard">Cancel</button>
    </form>
  </section>

  <section id="view-weekly" class="view">
    <form id="weekly-form" class="card" style="max-width: 640px; margin: 0 auto;">
      <h2>Weekly Check-in</h2>
      <label>1. Total relapses this week:<input type="number" name="totalRelapses" min="0" value="0" required /></label>
      <label>2. What helped?<textarea name="helpfulFactors"></textarea></label>
      <label>3. What was difficult?<textarea name="difficultFactors"></textarea></label>
      <label>4. Warning signs noticed<textarea name="warningSigns"></textarea></label>
      <label>5. Did the emergency plan work?<textarea name="emergencyPlanSuccess"></textarea></label>
      <label>6. Focus for next week<textarea name="focusNextWeek"></textarea></label>
      <button class="primary" type="submit">Save report</button>
      <button type="button" data-nav="dashboard">Cancel</button>
    </form>
  </section>

  <section id="view-daily" class="view">
    <form id="daily-form" class="card" style="max-width: 640px; margin: 0 auto;">
      <h2>Daily Check-in</h2>
      <label>How are you feeling today?<select name="mood">{{MOOD_OPTIONS}}</select></label>
      <label>Urge intensity: <span id="urge-value">1</span>/10
        <input type="range" name="urgeIntensity" min="1" max="10" value="1" />
      </label>
      <label>Notes<textarea name="notes"></textarea></label>
      <button class="primary" type="submit">Save check-in</button>
      <button type="button" data-nav="dashboard">Cancel</button>
    </form>
  </section>

  <script>
    const SOS_STEPS = [
      { title: 'Physical Reset', desc: 'Break the dopamine cycle instantly.',
        actions: ['Leave the room immediately.', 'Splash cold water on your face.', 'Do 20 Push-ups or Stretch for 3 mins.'] },
      { title: 'Environmental Control', desc: 'Remove the privacy required for the habit.',
        actions: ['Move to a public space or living room.', 'Turn on Website Blockers.', 'Leave bedroom door open.'] },
      { title: 'Healthy Distraction', desc: 'Shift your mind to something higher.',
        actions: ['Read 1 Psalm or Proverb.', 'Listen to worship/calming music.', 'Brisk walk for 5 minutes.'] },
      { title: 'Contact Point (Last Stand)', desc: "Don't fight this alone.",
        actions: ['Text your Accountability Partner:', '"I\'m at high risk. I need help."', 'DO NOT contact emotional triggers.'] },
    ];

    let currentId = null;
    let chartWindow = 'week';
    let timer = null;
    let sosStep = 0;

    const $ = (id) => document.getElementById(id);
    const esc = (text) => String(text ?? '').replace(/[&<>"]/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;' }[c]));
    const pad = (n) => String(n).padStart(2, '0');

    const api = async (path, options = {}) => {
      const resp = await fetch(path, options);
      if (!resp.ok) {
        const message = await resp.text();
        const err = new Error(message || resp.statusText);
        err.status = resp.status;
        throw err;
      }
      return resp.json();
    };

    const postJson = (path, body) => api(path, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body),
    });

    const show = (name) => {
      if (timer) {
        clearInterval(timer);
        timer = null;
      }
      document.querySelectorAll('.view').forEach((el) => el.classList.remove('active'));
      $(`view-${name}`).classList.add('active');
      if (name === 'select') {
        currentId = null;
        loadProfiles();
      } else if (name === 'dashboard') {
        loadDashboard();
      } else if (name === 'sos') {
        sosStep = 0;
        renderSos();
      }
    };

    const loadProfiles = async () => {
      const profiles = await api('/api/profiles');
      $('profiles').innerHTML = profiles.map((p) =>
        `<button class="profile-btn" data-profile="${esc(p.id)}"><strong>${esc(p.name)}</strong><br /><span class="muted">ID: ${esc(p.id.slice(0, 4))}...</span></button>`
      ).join('');
    };

    const startCountdown = (start) => {
      const startMs = new Date(start).getTime();
      const tick = () => {
        let diff = Math.floor((Date.now() - startMs) / 1000);
        if (!(diff > 0)) diff = 0;
        $('t-days').textContent = pad(Math.floor(diff / 86400));
        $('t-hours').textContent = pad(Math.floor((diff % 86400) / 3600));
        $('t-mins').textContent = pad(Math.floor((diff % 3600) / 60));
        $('t-secs').textContent = pad(diff % 60);
      };
      tick();
      timer = setInterval(tick, 1000);
    };

    const renderBars = (buckets) => {
      if (buckets.length === 0) {
        return '<div class="empty">No relapse data for this period. Stay strong!</div>';
      }
      const width = 480, height = 220, pad = 30;
      const max = Math.max(...buckets.map((b) => b.count));
      const step = (width - pad * 2) / buckets.length;
      const bars = buckets.map((b, i) => {
        const h = ((height - pad * 2) * b.count) / max;
        const x = pad + i * step + step * 0.15;
        return `<rect x="${x}" y="${height - pad - h}" width="${step * 0.7}" height="${h}" rx="4" fill="#f87171"><title>${b.count}</title></rect>` +
          `<text x="${x + step * 0.35}" y="${height - pad + 16}" text-anchor="middle">${esc(b.label)}</text>`;
      }).join('');
      return `<svg viewBox="0 0 ${width} ${height}" width="100%">${bars}<text x="4" y="${pad}">${max}</text></svg>`;
    };

    const renderLine = (points) => {
      if (points.length === 0) {
        return '<div class="empty">No daily logs yet.</div>';
      }
      const width = 480, height = 220, pad = 30;
      const xStep = points.length > 1 ? (width - pad * 2) / (points.length - 1) : 0;
      const x = (i) => pad + i * xStep;
      const y = (v) => height - pad - ((height - pad * 2) * v) / 10;
      const path = points.map((p, i) => `${i === 0 ? 'M' : 'L'}${x(i)},${y(p.urge)}`).join(' ');
      const dots = points.map((p, i) =>
        `<circle cx="${x(i)}" cy="${y(p.urge)}" r="4" fill="#10b981"><title>${esc(p.date)}: ${p.urge} (${esc(p.mood)}) ${esc(p.notes)}</title></circle>` +
        `<text x="${x(i)}" y="${height - 8}" text-anchor="middle">${esc(p.date)}</text>`
      ).join('');
      const ticks = [0, 2, 4, 6, 8, 10].map((v) => `<text x="4" y="${y(v) + 4}">${v}</text>`).join('');
      return `<svg viewBox="0 0 ${width} ${height}" width="100%">${ticks}<path d="${path}" fill="none" stroke="#10b981" stroke-width="3" />${dots}</svg>`;
    };

    const loadCharts = async () => {
      const chart = await api(`/api/profiles/${encodeURIComponent(currentId)}/charts/relapses?window=${chartWindow}`);
      $('relapse-chart').innerHTML = renderBars(chart.buckets);
      const urges = await api(`/api/profiles/${encodeURIComponent(currentId)}/charts/urges`);
      $('urge-chart').innerHTML = renderLine(urges);
    };

    const loadDashboard = async () => {
      let data;
      try {
        data = await api(`/api/profiles/${encodeURIComponent(currentId)}`);
      } catch (err) {
        if (err.status === 404) {
          show('select');
          return;
        }
        throw err;
      }
      $('profile-name').textContent = data.profile.name;
      startCountdown(data.profile.streakStartDate);

      $('daily-list').innerHTML = data.dailyCheckIns.map((c) =>
        `<div class="entry"><strong>${esc(c.mood)}</strong> <span class="muted">${new Date(c.date).toLocaleDateString()} · Urge: ${c.urgeIntensity}/10</span>${c.notes ? `<br /><em>"${esc(c.notes)}"</em>` : ''}</div>`
      ).join('') || '<p class="muted">No daily check-ins yet.</p>';

      $('relapse-list').innerHTML = data.relapses.map((r) =>
        `<div class="entry"><span class="muted">${new Date(r.date).toLocaleString()}</span> <strong>${esc(r.trigger)}</strong><br />Mood: ${esc(r.emotion)}<br />Fix: ${esc(r.improvementPlan)}</div>`
      ).join('') || '<p class="muted">No relapses recorded.</p>';

      $('weekly-list').innerHTML = data.reports.map((r) =>
        `<div class="entry"><span class="muted">${new Date(r.reportDate).toLocaleDateString()}</span> <strong>${r.totalRelapses} Relapses</strong><br />Helpful: ${esc(r.helpfulFactors)}<br />Focus: ${esc(r.focusNextWeek)}</div>`
      ).join('') || '<p class="muted">No weekly reports yet.</p>';

      await loadCharts();
    };

    const renderSos = () => {
      $('sos-steps').innerHTML = SOS_STEPS.map((s, i) => {
        const state = i < sosStep ? 'done' : i === sosStep ? 'current' : '';
        const next = i === sosStep ? '<button class="primary" data-sos-next>Done, next step</button>' : '';
        return `<div class="card sos-step ${state}" style="margin-bottom: 12px;"><h3>${i + 1}. ${esc(s.title)}</h3><p class="muted">${esc(s.desc)}</p><ul>${s.actions.map((a) => `<li>${esc(a)}</li>`).join('')}</ul>${next}</div>`;
      }).join('');
      $('sos-finished').style.display = sosStep >= SOS_STEPS.length ? 'block' : 'none';
    };

    const formBody = (form) => Object.fromEntries(new FormData(form).entries());

    const submitForm = (formId, path, convert) => {
      $(formId).addEventListener('submit', async (event) => {
        event.preventDefault();
        const body = convert(formBody(event.target));
        await postJson(`/api/profiles/${encodeURIComponent(currentId)}/${path}`, body);
        event.target.reset();
        show('dashboard');
      });
    };

    submitForm('relapse-form', 'relapses', (body) => body);
    submitForm('weekly-form', 'reports', (body) => ({ ...body, totalRelapses: Number(body.totalRelapses) || 0 }));
    submitForm('daily-form', 'check-ins', (body) => ({ ...body, urgeIntensity: Number(body.urgeIntensity) || 1 }));

    document.querySelector('#daily-form [name="urgeIntensity"]').addEventListener('input', (event) => {
      $('urge-value').textContent = event.target.value;
    });

    document.addEventListener('click', (event) => {
      const nav = event.target.closest('[data-nav]');
      if (nav) {
        show(nav.dataset.nav);
        return;
      }
      const profile = event.target.closest('[data-profile]');
      if (profile) {
        currentId = profile.dataset.profile;
        show('dashboard');
        return;
      }
      const windowBtn = event.target.closest('[data-window]');
      if (windowBtn) {
        chartWindow = windowBtn.dataset.window;
        document.querySelectorAll('[data-window]').forEach((b) => b.classList.toggle('on', b === windowBtn));
        loadCharts();
        return;
      }
      if (event.target.closest('[data-sos-next]')) {
        sosStep += 1;
        renderSos();
      }
    });

    $('add-profile').addEventListener('click', async () => {
      const name = $('new-name').value;
      if (!name.trim()) return;
      await postJson('/api/profiles', { name });
      $('new-name').value = '';
      loadProfiles();
    });

    $('import-file').addEventListener('change', (event) => {
      const file = event.target.files[0];
      if (!file) return;
      const reader = new FileReader();
      reader.onload = async () => {
        try {
          await api('/api/import', { method: 'POST', body: reader.result });
          alert('Data imported successfully!');
        } catch (err) {
          alert(err.message || 'Failed to parse JSON file.');
        }
        loadProfiles();
      };
      reader.onerror = () => alert('Failed to parse JSON file.');
      reader.readAsText(file);
      event.target.value = '';
    });

    loadProfiles();
  </script>
</body>
</html>
"##;
