/// Static dashboard page. Polls the JSON endpoints on a fixed interval and
/// renders into the DOM; no websockets, no server-sent events.
pub const PAGE: &str = r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Finanças Dashboard</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .glass { background: rgba(255,255,255,0.1); backdrop-filter: blur(16px); border: 1px solid rgba(255,255,255,0.2); }
        .live-dot { animation: pulse 2s infinite; background: #10b981; border-radius: 50%; height: 12px; width: 12px; display: inline-block; }
        @keyframes pulse { 0%,100%{opacity:1;transform:scale(1);} 50%{opacity:0.5;transform:scale(1.3);} }
    </style>
</head>
<body class="bg-gradient-to-br from-indigo-900 via-purple-900 to-pink-900 min-h-screen p-8 text-white">
    <div class="glass rounded-3xl p-8 mb-8 max-w-5xl mx-auto">
        <h1 class="text-4xl font-bold mb-2"><span class="live-dot"></span> Finanças Dashboard</h1>
        <p class="opacity-90">Gastos em tempo real e previsão de preços</p>
    </div>

    <div class="grid grid-cols-1 md:grid-cols-3 gap-6 mb-8 max-w-5xl mx-auto">
        <div class="glass p-6 rounded-2xl">
            <div class="text-3xl font-bold text-emerald-400" id="totalGastos">R$ 0</div>
            <div class="text-sm opacity-75 mt-1">Total Gastos</div>
        </div>
        <div class="glass p-6 rounded-2xl">
            <div class="text-3xl font-bold text-orange-400" id="alerta">--</div>
            <div class="text-sm opacity-75 mt-1">Alerta de Orçamento</div>
        </div>
        <div class="glass p-6 rounded-2xl">
            <input id="tickerInput" class="w-full p-3 bg-white/10 rounded-xl text-white placeholder-white/50" placeholder="PETR4.SA">
            <button onclick="predictTicker()" class="w-full mt-3 p-3 bg-emerald-500 hover:bg-emerald-600 rounded-xl font-semibold">Prever Preço</button>
        </div>
    </div>

    <div id="results" class="glass p-8 rounded-3xl max-w-5xl mx-auto mb-8"></div>
    <div id="despesas" class="glass p-8 rounded-3xl max-w-5xl mx-auto"></div>

    <script>
        const API_BASE = location.origin;
        const API_KEY = 'demo_key';

        async function apiCall(endpoint) {
            const res = await fetch(`${API_BASE}${endpoint}?api_key=${API_KEY}`);
            return await res.json();
        }

        async function loadMetrics() {
            const budget = await apiCall('/insights/budget');
            document.getElementById('totalGastos').textContent =
                'R$ ' + budget.total_gastos.toLocaleString('pt-BR', { maximumFractionDigits: 2 });
            document.getElementById('alerta').textContent = budget.alerta ? 'ESTOUROU' : 'OK';

            const despesas = await apiCall('/despesas');
            document.getElementById('despesas').innerHTML =
                '<div class="text-xl font-bold mb-4">Últimas despesas</div>' +
                despesas.map(d =>
                    `<div class="flex justify-between py-1 border-b border-white/10">
                        <span>${d.descricao} <span class="opacity-60">(${d.categoria})</span></span>
                        <span>R$ ${d.valor.toFixed(2)}</span>
                    </div>`
                ).join('');
        }

        async function predictTicker() {
            const ticker = document.getElementById('tickerInput').value || 'PETR4.SA';
            const data = await apiCall(`/predict/${ticker}`);

            document.getElementById('results').innerHTML = data.error
                ? `<div class="text-red-400">${data.error}</div>`
                : `<div class="text-2xl font-bold mb-4">${data.ticker}</div>
                   <div class="space-y-2 text-lg">
                       <div>Atual: $${data.preco_atual.toFixed(2)}</div>
                       <div>Previsão: $${data.previsao.toFixed(2)}</div>
                       <div>Variação: ${data.variacao.toFixed(2)}%</div>
                       <div>Confiança: ${(data.confianca * 100).toFixed(0)}%</div>
                   </div>`;
        }

        loadMetrics();
        setInterval(loadMetrics, 10000);
    </script>
</body>
</html>
"##;
